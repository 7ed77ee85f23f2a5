//! Configuration loading and output helpers of the tools.

use anyhow::{bail, Context};
use ard_bricks::config::HigherLevel;
use ard_bricks::grid::{Grid, GridConfig, TileId};
use ard_bricks::sensor::SensorTable;
use ard_bricks::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_derive::Deserialize;
use std::convert::TryFrom;
use std::fs::File;
use std::path::Path;

/// Layout of the configuration file.
#[derive(Deserialize)]
struct ConfigFile {
    grid: GridConfig,
    sensors: SensorTable,
    higher_level: HigherLevel,
}

/// Everything the readers need, validated.
#[derive(Debug)]
pub struct Setup {
    pub grid: Grid,
    pub sensors: SensorTable,
    pub higher: HigherLevel,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
    let buf = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(buf).with_context(|| format!("parsing {}", path.display()))?)
}

/// Read the JSON configuration at `path` and build its
/// grid.
pub fn read_setup(path: &Path) -> Result<Setup> {
    let cfg: ConfigFile = read_json(path)?;
    let grid = Grid::try_from(&cfg.grid).with_context(|| format!("grid of {}", path.display()))?;
    Ok(Setup {
        grid,
        sensors: cfg.sensors,
        higher: cfg.higher_level,
    })
}

/// Parse a tile given as its directory name (`X0069_Y0042`)
/// or as `x,y`.
pub fn parse_tile(s: &str) -> Result<TileId> {
    let s = s.trim();
    let (x, y) = if let Some(rest) = s.strip_prefix('X') {
        match rest.find("_Y") {
            Some(at) => (&rest[..at], &rest[at + 2..]),
            None => bail!("malformed tile {}", s),
        }
    } else {
        match s.find(',') {
            Some(at) => (&s[..at], &s[at + 1..]),
            None => bail!("malformed tile {}", s),
        }
    };
    let x = x.trim().parse().with_context(|| format!("tile column of {}", s))?;
    let y = y.trim().parse().with_context(|| format!("tile row of {}", s))?;
    Ok(TileId::new(x, y))
}

pub fn print_json<T: Serialize>(json: &T) -> Result<()> {
    let writer = std::io::BufWriter::new(std::io::stdout());
    Ok(serde_json::to_writer(writer, json)?)
}

/// Release of the raster library the readers are linked
/// against.
pub fn gdal_release() -> String {
    gdal::version::version_info("RELEASE_NAME")
}
