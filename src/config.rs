//! Parameters of the higher-level readers. The record is
//! populated by the caller (eg. deserialized from a JSON
//! file by the tools) and read-only while reading.

use serde_derive::Deserialize;
use std::path::PathBuf;

use crate::date::Date;

/// Auxiliary product tokens of the ARD record.
pub const DST: &str = "DST";
pub const AOD: &str = "AOD";
pub const HOT: &str = "HOT";
pub const VZN: &str = "VZN";
pub const WVP: &str = "WVP";

#[derive(Clone, Debug, Deserialize)]
pub struct HigherLevel {
    /// Root of the per-tile ARD directories.
    pub lower_dir: PathBuf,
    #[serde(default)]
    pub mask: Option<MaskConfig>,

    pub date_range: DateRange,
    #[serde(default)]
    pub doy_range: DoyRange,

    #[serde(default)]
    pub products: Products,

    /// Point spread function aggregation when the files are
    /// finer than the grid.
    #[serde(default)]
    pub psf: bool,
    /// Border (ground units) added around each chunk for
    /// kernel based processing. Zero disables stitching.
    #[serde(default)]
    pub radius: f64,

    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default = "default_feature_nodata")]
    pub feature_nodata: i16,

    #[serde(default)]
    pub confield: Option<ConField>,
}

fn default_feature_nodata() -> i16 {
    -9999
}

/// Processing mask: one file per tile, named `basename`.
#[derive(Clone, Debug, Deserialize)]
pub struct MaskConfig {
    pub dir: PathBuf,
    pub basename: String,
}

/// Inclusive range of acquisition dates.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DateRange {
    pub min: Date,
    pub max: Date,
}

impl DateRange {
    pub fn contains(&self, date: &Date) -> bool {
        date.ce() >= self.min.ce() && date.ce() <= self.max.ce()
    }
}

/// Inclusive range of days-of-year. A range with `min >
/// max` wraps around the turn of the year (eg. `[335, 59]`
/// for winter).
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DoyRange {
    pub min: u16,
    pub max: u16,
}

impl Default for DoyRange {
    fn default() -> Self {
        DoyRange { min: 1, max: 365 }
    }
}

impl DoyRange {
    pub fn contains(&self, doy: u16) -> bool {
        if self.min <= self.max {
            doy >= self.min && doy <= self.max
        } else {
            doy >= self.min || doy <= self.max
        }
    }
}

/// Products to read for each acquisition.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Products {
    pub reflectance: bool,
    pub quality: bool,
    pub cloud_distance: bool,
    pub aerosol: bool,
    pub haze: bool,
    pub view_zenith: bool,
    pub water_vapor: bool,
}

impl Default for Products {
    fn default() -> Self {
        Products {
            reflectance: true,
            quality: true,
            cloud_distance: false,
            aerosol: false,
            haze: false,
            view_zenith: false,
            water_vapor: false,
        }
    }
}

/// A feature: one band of a file in each tile directory.
#[derive(Clone, Debug, Deserialize)]
pub struct Feature {
    pub basename: String,
    #[serde(default = "default_band")]
    pub band: usize,
}

fn default_band() -> usize {
    1
}

/// Continuous fields (eg. phenology): all bands of each of
/// `files` in the tile directories under `dir`.
#[derive(Clone, Debug, Deserialize)]
pub struct ConField {
    pub dir: PathBuf,
    pub files: Vec<String>,
    #[serde(default = "default_feature_nodata")]
    pub nodata: i16,
}

impl HigherLevel {
    /// Minimal configuration: all reflectance and quality
    /// products of `lower_dir` within `date_range`.
    pub fn new(lower_dir: PathBuf, date_range: DateRange) -> Self {
        HigherLevel {
            lower_dir,
            mask: None,
            date_range,
            doy_range: Default::default(),
            products: Default::default(),
            psf: false,
            radius: 0.,
            features: vec![],
            feature_nodata: default_feature_nodata(),
            confield: None,
        }
    }

    /// Whether the chunks must be padded with their
    /// neighbours.
    pub fn stitching(&self) -> bool {
        self.radius > 0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doy_ranges() {
        let summer = DoyRange { min: 152, max: 243 };
        assert!(summer.contains(200));
        assert!(!summer.contains(10));

        let winter = DoyRange { min: 335, max: 59 };
        assert!(winter.contains(10));
        assert!(winter.contains(350));
        assert!(!winter.contains(200));

        assert!(DoyRange::default().contains(1));
        assert!(DoyRange::default().contains(365));
    }

    #[test]
    fn deserialize() {
        let cfg: HigherLevel = serde_json::from_str(
            r#"{
                "lower_dir": "/data/level2",
                "date_range": {"min": "2018-01-01", "max": "2018-12-31"},
                "products": {"cloud_distance": true},
                "psf": true,
                "radius": 60,
                "features": [{"basename": "2018_NDVI.tif"}]
            }"#,
        )
        .unwrap();
        assert!(cfg.products.reflectance && cfg.products.cloud_distance);
        assert!(!cfg.products.aerosol);
        assert!(cfg.stitching());
        assert_eq!(cfg.features[0].band, 1);
        assert_eq!(cfg.feature_nodata, -9999);
        assert!(cfg.date_range.contains(&Date::from_ymd(2018, 6, 1).unwrap()));
        assert!(!cfg.date_range.contains(&Date::from_ymd(2019, 1, 1).unwrap()));
    }
}
