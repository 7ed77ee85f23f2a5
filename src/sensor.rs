//! Sensor dictionary of the reflectance products.
//!
//! Sensors record the same spectral domains (eg. `BLUE`,
//! `NIR`) in different band numbers, and some domains are
//! not recorded at all. The table maps every requested
//! domain, per sensor, to either a band in the file, a
//! synthetic (nodata-filled) band, or nothing.

use serde_derive::Deserialize;
use std::convert::TryFrom;

use crate::error::IntegrityError;

/// One sensor of the table. `bands[d]` is the 1-based band
/// in the file holding domain `d`; `0` requests a synthetic
/// band, negative values drop the domain.
#[derive(Clone, Debug, Deserialize)]
pub struct Sensor {
    pub code: String,
    pub bands: Vec<i32>,
}

/// Where a brick band comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandSource {
    /// 1-based band in the file
    Disk(usize),
    /// Not recorded by the sensor, filled with nodata
    Synthetic,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "SensorTableConfig")]
pub struct SensorTable {
    domains: Vec<String>,
    sensors: Vec<Sensor>,
    main_product: String,
    quality_product: Option<String>,
}

#[derive(Deserialize)]
struct SensorTableConfig {
    domains: Vec<String>,
    sensors: Vec<Sensor>,
    main_product: String,
    #[serde(default)]
    quality_product: Option<String>,
}

impl TryFrom<SensorTableConfig> for SensorTable {
    type Error = IntegrityError;

    fn try_from(cfg: SensorTableConfig) -> Result<Self, Self::Error> {
        SensorTable::new(
            cfg.domains,
            cfg.sensors,
            cfg.main_product,
            cfg.quality_product,
        )
    }
}

impl SensorTable {
    /// Assemble a table. Every sensor must map each of the
    /// `domains`.
    pub fn new(
        domains: Vec<String>,
        sensors: Vec<Sensor>,
        main_product: String,
        quality_product: Option<String>,
    ) -> Result<Self, IntegrityError> {
        for s in &sensors {
            if s.bands.len() != domains.len() {
                return Err(IntegrityError::BandMap {
                    sensor: s.code.clone(),
                    got: s.bands.len(),
                    expected: domains.len(),
                });
            }
        }
        Ok(SensorTable {
            domains,
            sensors,
            main_product,
            quality_product: quality_product.filter(|q| !q.is_empty() && q != "NULL"),
        })
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Product token of the reflectance files, eg. `BOA`.
    pub fn main_product(&self) -> &str {
        &self.main_product
    }

    /// Product token of the quality files, if the sensors
    /// have one.
    pub fn quality_product(&self) -> Option<&str> {
        self.quality_product.as_deref()
    }

    /// Bands of a reflectance brick of sensor `sid`, as
    /// `(domain index, source)` in brick order.
    pub fn brick_bands(&self, sid: usize) -> Vec<(usize, BandSource)> {
        self.sensors[sid]
            .bands
            .iter()
            .enumerate()
            .filter_map(|(d, &b)| match b {
                b if b < 0 => None,
                0 => Some((d, BandSource::Synthetic)),
                b => Some((d, BandSource::Disk(b as usize))),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Four sensors mapping `BLUE, GREEN, RED, RE1, NIR`.
    pub(crate) fn landsat_sentinel() -> SensorTable {
        let sensor = |code: &str, bands: &[i32]| Sensor {
            code: code.into(),
            bands: bands.to_vec(),
        };
        SensorTable::new(
            ["BLUE", "GREEN", "RED", "RE1", "NIR"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                sensor("LND07", &[1, 2, 3, 0, 4]),
                sensor("LND08", &[1, 2, 3, 0, 4]),
                sensor("SEN2A", &[1, 2, 3, 4, 7]),
                sensor("SEN2B", &[1, 2, 3, 4, -1]),
            ],
            "BOA".into(),
            Some("QAI".into()),
        )
        .unwrap()
    }

    #[test]
    fn band_selection() {
        let table = landsat_sentinel();
        use BandSource::*;
        assert_eq!(
            table.brick_bands(0),
            vec![(0, Disk(1)), (1, Disk(2)), (2, Disk(3)), (3, Synthetic), (4, Disk(4))]
        );
        assert_eq!(table.brick_bands(3).len(), 4);
    }

    #[test]
    fn rejects_short_band_maps() {
        let res = SensorTable::new(
            vec!["BLUE".into(), "GREEN".into()],
            vec![Sensor {
                code: "LND08".into(),
                bands: vec![1],
            }],
            "BOA".into(),
            None,
        );
        assert!(res.is_err());
    }

    #[test]
    fn null_quality_product() {
        let table = SensorTable::new(vec![], vec![], "BOA".into(), Some("NULL".into())).unwrap();
        assert_eq!(table.quality_product(), None);
    }

    #[test]
    fn deserialize() {
        let table: SensorTable = serde_json::from_str(
            r#"{
                "domains": ["BLUE", "NIR"],
                "sensors": [{"code": "SEN2A", "bands": [1, 7]}],
                "main_product": "BOA"
            }"#,
        )
        .unwrap();
        assert_eq!(table.sensors()[0].code, "SEN2A");
        assert_eq!(table.quality_product(), None);
    }
}
