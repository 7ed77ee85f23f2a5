use clap::*;
use log::{debug, error, info};
use rayon::prelude::*;
use std::path::PathBuf;

use ard_bricks::prelude::*;
use ard_tools::cli::args::{optional_arg, tile_arg};
use ard_tools::{args_parser, arg, opt, utils::*, Result, Tracker};

mod summary;
use summary::{ChunkSummary, ItemSummary};

// Main function
ard_tools::sync_main!(run());

fn run() -> Result<()> {
    // Parse command line
    let args = parse_cmd_line();
    let setup = read_setup(&args.config)?;
    debug!("raster library {}", gdal_release());

    let grid = &setup.grid;
    let chunks: Vec<ChunkWindow> = grid
        .par_chunks()
        .filter(|&(_, c, _)| args.chunk.map_or(true, |chunk| chunk == c))
        .collect();
    if chunks.is_empty() {
        anyhow::bail!("no chunk {:?}, the tile has {}", args.chunk, grid.chunk_count());
    }
    info!(
        "reading {} of {} chunk(s) of {}",
        args.input.name(),
        chunks.len(),
        args.tile
    );

    let opener = GdalOpener;
    let reader = ArdReader::new(&opener, grid, &setup.sensors, &setup.higher);
    let tracker = Tracker::new("chunks", chunks.len());

    let results: Vec<(usize, ArdResult<Fetch<ChunkSummary>>)> = chunks
        .par_iter()
        .map(|&(_, chunk, row)| {
            debug!("chunk {} starts at row {}", chunk, row);
            let res = read_chunk(&reader, args.input, args.tile, chunk);
            let bytes = match &res {
                Ok(Fetch::Data(s)) => s.bytes,
                _ => 0,
            };
            tracker.record(&res, bytes);
            (chunk, res)
        })
        .collect();
    drop(tracker);

    let mut report = Report {
        tile: args.tile.to_string(),
        chunks: vec![],
        empty: vec![],
        failed: vec![],
    };
    for (chunk, res) in results {
        match res {
            Ok(Fetch::Data(summary)) => report.chunks.push(summary),
            Ok(Fetch::Empty) => report.empty.push(chunk),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                error!("chunk {}: {}", chunk, e);
                report.failed.push(chunk);
            }
        }
    }

    print_json(&report)?;
    Ok(())
}

#[derive(serde_derive::Serialize)]
struct Report {
    tile: String,
    chunks: Vec<ChunkSummary>,
    empty: Vec<usize>,
    failed: Vec<usize>,
}

fn read_chunk<O: RasterOpener>(
    reader: &ArdReader<O>,
    input: Input,
    tile: TileId,
    chunk: usize,
) -> ArdResult<Fetch<ChunkSummary>> {
    let batch = match input {
        Input::Ard => reader.read_ard(tile, chunk)?,
        Input::Features => reader.read_features(tile, chunk)?,
        Input::ConField => reader.read_confield(tile, chunk)?,
        Input::Mask => {
            return Ok(match reader.read_mask(tile, chunk)? {
                Fetch::Data(Some(mask)) => Fetch::Data(ChunkSummary {
                    chunk,
                    bytes: mask.byte_size(),
                    items: vec![ItemSummary::of_brick(&mask)],
                }),
                Fetch::Data(None) => {
                    info!("no processing mask configured");
                    Fetch::Empty
                }
                Fetch::Empty => Fetch::Empty,
            });
        }
    };

    Ok(match batch {
        Fetch::Data(batch) => Fetch::Data(ChunkSummary {
            chunk,
            bytes: batch.bytes,
            items: batch.items.iter().filter_map(ItemSummary::of_ard).collect(),
        }),
        Fetch::Empty => Fetch::Empty,
    })
}

/// Inputs of a chunk that can be read.
#[derive(Clone, Copy, Debug)]
enum Input {
    Ard,
    Features,
    ConField,
    Mask,
}

impl Input {
    const NAMES: [&'static str; 4] = ["ard", "features", "confield", "mask"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ard" => Some(Input::Ard),
            "features" => Some(Input::Features),
            "confield" => Some(Input::ConField),
            "mask" => Some(Input::Mask),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Input::Ard => "acquisitions",
            Input::Features => "features",
            Input::ConField => "continuous fields",
            Input::Mask => "processing mask",
        }
    }
}

/// Program arguments
struct Args {
    /// Configuration file (JSON)
    config: PathBuf,
    /// Tile to read
    tile: TileId,
    /// Single chunk to read (default: all)
    chunk: Option<usize>,
    /// What to read
    input: Input,
}

fn parse_cmd_line() -> Args {
    let matches = args_parser!("ard-read")
        .about("Read the chunks of a tile and summarize the bricks.")
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
            opt!("chunk")
                .short("c")
                .help("Read only this chunk (default: all chunks)"),
        )
        .arg(
            opt!("input")
                .short("i")
                .possible_values(&Input::NAMES)
                .help("What to read (default: ard)"),
        )
        .get_matches();

    let config = value_t!(matches, "config", PathBuf).unwrap_or_else(|e| e.exit());
    let tile = tile_arg(&matches, "tile");
    let chunk = optional_arg(&matches, "chunk");
    let input = matches
        .value_of("input")
        .and_then(Input::from_name)
        .unwrap_or(Input::Ard);

    Args {
        config,
        tile,
        chunk,
        input,
    }
}
