//! List the product files of a tile.
//!
//! A [`DirListing`] owns both the raw directory listing and
//! the selected entries, and is never handed out with an
//! empty selection: an empty selection is reported as
//! [`Fetch::Empty`] (nothing to do in this tile).

use log::debug;
use std::path::{Path, PathBuf};

use crate::config::{DateRange, DoyRange, HigherLevel, MaskConfig};
use crate::error::Fetch;
use crate::filename::date_ard;
use crate::grid::TileId;
use crate::sensor::SensorTable;

/// Extensions of the raster formats written by the ARD
/// producers.
pub const RASTER_EXTENSIONS: [&str; 5] = ["dat", "bsq", "bil", "tif", "vrt"];

/// Directory of `tile` under `root`.
pub fn tile_dir(root: &Path, tile: TileId) -> PathBuf {
    root.join(tile.to_string())
}

#[derive(Clone, Debug)]
pub struct DirListing {
    dir: PathBuf,
    raw: Vec<String>,
    selected: Vec<String>,
}

impl DirListing {
    /// List `dir` and keep the entries accepted by
    /// `predicate`, in alphabetical order. Missing or
    /// unreadable directories have nothing to do.
    pub fn scan<F: Fn(&str) -> bool>(dir: PathBuf, predicate: F) -> Fetch<Self> {
        let raw = match read_sorted(&dir) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("cannot list {}: {}", dir.display(), e);
                return Fetch::Empty;
            }
        };
        debug!("found {} files in {}, filtering now", raw.len(), dir.display());

        let selected = raw.iter().filter(|n| predicate(n)).cloned().collect();
        DirListing { dir, raw, selected }.non_empty()
    }

    fn non_empty(self) -> Fetch<Self> {
        if self.selected.is_empty() {
            Fetch::Empty
        } else {
            Fetch::Data(self)
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every entry of the directory.
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// Selected entry names (never empty).
    pub fn entries(&self) -> &[String] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Full path of the `i`-th selected entry.
    pub fn path(&self, i: usize) -> PathBuf {
        self.dir.join(&self.selected[i])
    }

    pub fn paths(&self) -> impl ExactSizeIterator<Item = PathBuf> + '_ {
        self.selected.iter().map(move |n| self.dir.join(n))
    }

    /// Retain only entries acquired within `[ce_min,
    /// ce_max]` (days since CE).
    pub fn filter_ce(mut self, ce_min: i32, ce_max: i32) -> Fetch<Self> {
        self.selected.retain(|n| match date_ard(n) {
            Some(d) => d.ce() >= ce_min && d.ce() <= ce_max,
            None => false,
        });
        debug!("{} datasets within ce limits", self.selected.len());
        self.non_empty()
    }
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = vec![];
    for entry in std::fs::read_dir(dir)? {
        if let Ok(name) = entry?.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Predicates selecting the main product files of a tile.
pub struct ArdFilter<'a> {
    pub sensors: &'a SensorTable,
    pub dates: DateRange,
    pub doys: DoyRange,
}

impl<'a> ArdFilter<'a> {
    pub fn new(sensors: &'a SensorTable, cfg: &HigherLevel) -> Self {
        ArdFilter {
            sensors,
            dates: cfg.date_range,
            doys: cfg.doy_range,
        }
    }

    /// Raster extension, main product, one of the sensors,
    /// date and day-of-year within range.
    pub fn accepts(&self, name: &str) -> bool {
        let ext_ok = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| RASTER_EXTENSIONS.contains(&e));
        if !ext_ok || !name.contains(self.sensors.main_product()) {
            return false;
        }

        let sensor_ok = self
            .sensors
            .sensors()
            .iter()
            .any(|s| !s.code.is_empty() && name.contains(s.code.as_str()));
        if !sensor_ok {
            return false;
        }

        match date_ard(name) {
            Some(date) => self.dates.contains(&date) && self.doys.contains(date.doy()),
            None => false,
        }
    }

    pub fn apply<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| self.accepts(n))
            .map(String::from)
            .collect()
    }
}

/// List the main product files of `tile`.
pub fn list_ard(tile: TileId, sensors: &SensorTable, cfg: &HigherLevel) -> Fetch<DirListing> {
    let filter = ArdFilter::new(sensors, cfg);
    let listing = DirListing::scan(tile_dir(&cfg.lower_dir, tile), |n| filter.accepts(n));
    if let Fetch::Data(l) = &listing {
        debug!("{} datasets in {}", l.len(), l.dir().display());
    }
    listing
}

/// List the processing mask of `tile`.
pub fn list_mask(tile: TileId, mask: &MaskConfig) -> Fetch<DirListing> {
    DirListing::scan(tile_dir(&mask.dir, tile), |n| n == mask.basename)
}
