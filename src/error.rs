//! Classified errors of the reading pipeline.
//!
//! Errors fall in two classes. Integrity violations mean
//! the file catalogue or configuration is inconsistent with
//! the grid; callers must not continue past them (see
//! [`ArdError::is_fatal`]). Everything else concerns a
//! single item (one file of a batch) and is counted and
//! skipped by the batch readers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArdError {
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("unable to open {}: {cause:#}", .path.display())]
    Open { path: PathBuf, cause: anyhow::Error },

    #[error("could not read band {band} of {}: {cause:#}", .path.display())]
    Read {
        path: PathBuf,
        band: usize,
        cause: anyhow::Error,
    },

    #[error("error in assembling filename for neighbouring block of {}", .path.display())]
    NeighborPath { path: PathBuf },

    #[error("could not generate kernel: {0}")]
    Kernel(String),

    #[error("{errors} reading errors")]
    Batch { errors: usize },
}

#[derive(Error, Debug)]
pub enum IntegrityError {
    #[error("requested {what} {value} must be a multiple of {against} {res} ({rem} > {tol})")]
    NotMultiple {
        what: &'static str,
        value: f64,
        against: &'static str,
        res: f64,
        rem: f64,
        tol: f64,
    },

    #[error("getting {field} of ARD failed ({basename})")]
    Filename {
        field: &'static str,
        basename: String,
    },

    #[error("invalid grid: {0}")]
    Grid(String),

    #[error("stitching radius must span at least one pixel, got {0}")]
    Radius(f64),

    #[error("no sensor table to map the bands of {0}")]
    NoSensorTable(String),

    #[error("sensor {sensor} has {got} band map entries, expected {expected}")]
    BandMap {
        sensor: String,
        got: usize,
        expected: usize,
    },
}

impl ArdError {
    /// Whether the error invalidates the whole run rather
    /// than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ArdError::Integrity(_))
    }
}

pub type ArdResult<T> = std::result::Result<T, ArdError>;

/// Outcome of reads that may legitimately find nothing to
/// process (eg. a tile without any matching file). Distinct
/// from an error: callers skip the tile or chunk silently.
#[derive(Debug)]
pub enum Fetch<T> {
    Data(T),
    Empty,
}

impl<T> Fetch<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Fetch::Data(t) => Some(t),
            Fetch::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fetch::Empty)
    }
}
