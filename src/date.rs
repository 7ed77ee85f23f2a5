//! Calendar dates of acquisitions.
//!
//! Day counts use a fixed 365-day year: the day-of-year of
//! a date ignores leap days (29 February shares the day of
//! 1 March), and the CE-day is `365 * year + doy`. Both are
//! only used to filter and order acquisitions, so the
//! approximation is harmless and keeps every year the same
//! length.

use serde_derive::Deserialize;
use std::convert::TryFrom;
use std::fmt;

const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DAYS_IN_MONTH: [u16; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// An acquisition date. The all-zero value (`Date::default`)
/// is the sentinel for "no date".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Date {
    // field order gives chronological `Ord`
    ce: i32,
    year: i32,
    month: u16,
    day: u16,
    doy: u16,
    week: u16,
}

impl Date {
    /// Build a date from its calendar fields, deriving
    /// day-of-year, week and CE-day. Returns `None` if any
    /// field is out of the supported range (years
    /// 1900-2100).
    pub fn from_ymd(year: i32, month: u16, day: u16) -> Option<Date> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day > DAYS_IN_MONTH[month as usize - 1] {
            return None;
        }

        let doy = (DAYS_BEFORE_MONTH[month as usize - 1] + day).min(365);
        let week = ((doy - 1) / 7 + 1).min(52);
        let date = Date {
            year,
            month,
            day,
            doy,
            week,
            ce: 365 * year + doy as i32,
        };

        if date.is_valid() {
            Some(date)
        } else {
            None
        }
    }

    /// Parse the date from a token that starts with
    /// `YYYYMMDD`.
    pub fn from_compact(token: &str) -> Option<Date> {
        let digits = token.get(0..8)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = digits[0..4].parse().ok()?;
        let month = digits[4..6].parse().ok()?;
        let day = digits[6..8].parse().ok()?;
        Date::from_ymd(year, month, day)
    }

    pub fn is_valid(&self) -> bool {
        (1900..=2100).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && (1..=365).contains(&self.doy)
            && (1..=52).contains(&self.week)
            && (1900 * 365..=2100 * 365).contains(&self.ce)
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u16 {
        self.month
    }
    pub fn day(&self) -> u16 {
        self.day
    }
    pub fn doy(&self) -> u16 {
        self.doy
    }
    pub fn week(&self) -> u16 {
        self.week
    }
    /// Days since the common era, in 365-day years.
    pub fn ce(&self) -> i32 {
        self.ce
    }
}

/// Accepts `YYYY-MM-DD` and `YYYYMMDD`.
impl TryFrom<String> for Date {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let compact: String = s.trim().chars().filter(|c| *c != '-').collect();
        if compact.len() != 8 {
            return Err(format!("malformed date: {}", s));
        }
        Date::from_compact(&compact).ok_or_else(|| format!("invalid date: {}", s))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
