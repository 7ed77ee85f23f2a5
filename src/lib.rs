//! Read analysis-ready-data (ARD) bricks from a tiled data
//! cube.
//!
//! The processing area is split into square tiles, and
//! every tile into horizontal chunks. A [`Brick`] holds the
//! pixels of one chunk of one product file, resampled to
//! the grid resolution. This crate provides:
//!
//! - [`listing`] - select the product files of a tile by
//! product, sensor and acquisition date.
//!
//! - [`block`] - read one chunk (or a strip of it) from a
//! file, with nearest-neighbour or point-spread-function
//! resampling ([`psf`]).
//!
//! - [`stitch`] - pad a brick with the border pixels of the
//! eight neighbouring chunks.
//!
//! - [`ard`] - read all the products of a tile chunk in
//! parallel.
//!
//! [`Brick`]: crate::brick::Brick

pub mod ard;
pub mod block;
pub mod brick;
pub mod config;
pub mod date;
pub mod error;
pub mod filename;
pub mod geometry;
pub mod grid;
pub mod kernel;
pub mod listing;
pub mod prelude;
pub mod psf;
pub mod sensor;
pub mod source;
pub mod stitch;

#[cfg(test)]
mod testing;

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
