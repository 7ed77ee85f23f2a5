use anyhow::anyhow;
use clap::*;
use log::info;
use serde_derive::Serialize;
use std::convert::TryFrom;
use std::path::PathBuf;

use ard_bricks::filename::{date_ard, product_ard, sensor_ard};
use ard_bricks::prelude::*;
use ard_tools::cli::args::tile_arg;
use ard_tools::{args_parser, arg, opt, utils::*, Result};

// Main function
ard_tools::sync_main!(run());

/// One selected file of the tile.
#[derive(Serialize)]
struct Entry {
    name: String,
    date: String,
    sensor: String,
    product: String,
}

fn run() -> Result<()> {
    let args = parse_cmd_line()?;
    let setup = read_setup(&args.config)?;

    let listing = list_ard(args.tile, &setup.sensors, &setup.higher);
    let listing = match (listing, args.ce_range) {
        (Fetch::Data(l), Some((min, max))) => l.filter_ce(min.ce(), max.ce()),
        (listing, _) => listing,
    };

    let entries: Vec<_> = match &listing {
        Fetch::Data(l) => l
            .entries()
            .iter()
            .map(|name| Entry {
                name: name.clone(),
                date: date_ard(name).unwrap_or_default().to_string(),
                sensor: sensor_ard(name, &setup.sensors)
                    .map(|s| setup.sensors.sensors()[s].code.clone())
                    .unwrap_or_default(),
                product: product_ard(name).unwrap_or_default().into(),
            })
            .collect(),
        Fetch::Empty => {
            info!("nothing to do in {}", args.tile);
            vec![]
        }
    };
    info!("{} datasets selected in {}", entries.len(), args.tile);

    print_json(&entries)?;
    Ok(())
}

/// Program arguments
struct Args {
    /// Configuration file (JSON)
    config: PathBuf,
    /// Tile to list
    tile: TileId,
    /// Restrict to acquisitions within these dates
    ce_range: Option<(Date, Date)>,
}

fn parse_cmd_line() -> Result<Args> {
    let matches = args_parser!("ard-list")
        .about("List the acquisitions of a tile selected by the configuration.")
        .arg(
            arg!("config")
                .required(true)
                .help("Configuration file (JSON)"),
        )
        .arg(
            arg!("tile")
                .required(true)
                .help("Tile as X0069_Y0042 or 69,42"),
        )
        .arg(
            opt!("from")
                .requires("until")
                .help("First acquisition date (YYYY-MM-DD)"),
        )
        .arg(
            opt!("until")
                .requires("from")
                .help("Last acquisition date (YYYY-MM-DD)"),
        )
        .get_matches();

    let config = value_t!(matches, "config", PathBuf).unwrap_or_else(|e| e.exit());
    let tile = tile_arg(&matches, "tile");

    let date = |name: &str| -> Result<Option<Date>> {
        matches
            .value_of(name)
            .map(|s| Date::try_from(s.to_string()).map_err(|e| anyhow!("{}: {}", name, e)))
            .transpose()
    };
    let ce_range = match (date("from")?, date("until")?) {
        (Some(from), Some(until)) => Some((from, until)),
        _ => None,
    };

    Ok(Args {
        config,
        tile,
        ce_range,
    })
}
