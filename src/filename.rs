//! Metadata encoded in ARD basenames.
//!
//! ARD basenames are fixed-width records, eg.
//! `20180923_LEVEL2_SEN2A_BOA.tif`:
//!
//! | offset | width | field                          |
//! |--------|-------|--------------------------------|
//! | 0      | 8     | acquisition date, `YYYYMMDD`   |
//! | 16     | 5     | sensor, eg. `SEN2A` or `LND08` |
//! | 22     | 3     | product, eg. `BOA` or `QAI`    |
//!
//! The offsets are part of the file naming contract, and
//! are extracted as such.

use crate::date::Date;
use crate::sensor::SensorTable;

const DATE_FIELD: (usize, usize) = (0, 8);
const SENSOR_FIELD: (usize, usize) = (16, 5);
const PRODUCT_FIELD: (usize, usize) = (22, 3);

/// Separators of band labels, see [`date_from_bandname`].
const LABEL_SEPARATORS: &[char] = &[' ', ',', ';', '-', '_', '.'];

#[inline]
fn field(basename: &str, (offset, width): (usize, usize)) -> Option<&str> {
    basename.get(offset..offset + width)
}

/// Acquisition date of an ARD basename.
pub fn date_ard(basename: &str) -> Option<Date> {
    field(basename, DATE_FIELD).and_then(Date::from_compact)
}

/// Product code of an ARD basename, eg. `BOA`.
pub fn product_ard(basename: &str) -> Option<&str> {
    field(basename, PRODUCT_FIELD)
}

/// Index in `sensors` of the first sensor whose code is
/// contained in the sensor field of the basename.
pub fn sensor_ard(basename: &str, sensors: &SensorTable) -> Option<usize> {
    let code = field(basename, SENSOR_FIELD)?;
    sensors
        .sensors()
        .iter()
        .position(|s| !s.code.is_empty() && code.contains(s.code.as_str()))
}

/// Date of a user supplied band label (eg. `20180923_NDVI`
/// or `20180923.tif`). Labels without a leading `YYYYMMDD`
/// token (`NDVI`, `2018-09-23`) are common, so a missing
/// date is not an error: the zero date is returned along
/// with `false`.
pub fn date_from_bandname(label: &str) -> (Date, bool) {
    let label = match label.find(|c| c == '\r' || c == '\n' || c == '#') {
        Some(end) => &label[..end],
        None => label,
    };

    let token = label
        .split(LABEL_SEPARATORS)
        .find(|t| !t.is_empty())
        .unwrap_or("");

    if token.len() != 8 {
        return (Date::default(), false);
    }
    match Date::from_compact(token) {
        Some(date) => (date, true),
        None => (Date::default(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::tests::landsat_sentinel;

    const BOA: &str = "20180923_LEVEL2_SEN2A_BOA.tif";

    #[test]
    fn fixed_fields() {
        assert_eq!(date_ard(BOA), Date::from_ymd(2018, 9, 23));
        assert_eq!(product_ard(BOA), Some("BOA"));
        assert_eq!(product_ard("20180923_LEVEL2_SEN2A_B"), None);
    }

    #[test]
    fn invalid_dates() {
        assert_eq!(date_ard("20181323_LEVEL2_SEN2A_BOA.tif"), None);
        assert_eq!(date_ard("18000923_LEVEL2_SEN2A_BOA.tif"), None);
        assert_eq!(date_ard("2018"), None);
    }

    #[test]
    fn sensors() {
        let sensors = landsat_sentinel();
        assert_eq!(sensor_ard(BOA, &sensors), Some(2));
        assert_eq!(
            sensor_ard("20180923_LEVEL2_LND08_BOA.tif", &sensors),
            Some(1)
        );
        assert_eq!(sensor_ard("20180923_LEVEL2_MOD01_BOA.tif", &sensors), None);
        assert_eq!(sensor_ard("20180923_LEVEL2", &sensors), None);
    }

    #[test]
    fn band_labels() {
        let (date, ok) = date_from_bandname("20180923_NDVI");
        assert!(ok);
        assert_eq!(Some(date), Date::from_ymd(2018, 9, 23));

        let (date, ok) = date_from_bandname("  20180923.tif\n");
        assert!(ok);
        assert_eq!(date.doy(), 266);

        for label in &["NDVI", "2018-09-23", "20181323_X", "", "#20180923"] {
            let (date, ok) = date_from_bandname(label);
            assert!(!ok, "{}", label);
            assert_eq!(date, Date::default());
        }
    }
}
