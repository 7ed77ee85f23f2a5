//! Geometry of the tiled data cube.
//!
//! # Tiles and chunks
//!
//! The processing area is partitioned into square tiles of
//! `tile_size` ground units, addressed by integer `(x, y)`
//! indices. Every tile is stored in its own directory
//! (`X0069_Y0042`) and all product files of the tile share
//! the same extent.
//!
//! Tiles are too large to process in memory, so each tile
//! is further split into horizontal **chunks** of
//! `chunk_size` ground units. A chunk spans the full width
//! of the tile and chunks are numbered top to bottom. The
//! chunk is the unit of streaming I/O: a [`Brick`] holds
//! one chunk of one product file.
//!
//! # Neighbourhood
//!
//! Walking up from the first chunk of a tile leads into the
//! last chunk of the tile above; walking down from the last
//! chunk leads into the first chunk of the tile below. See
//! [`Grid::neighbor_chunk`].
//!
//! [`Brick`]: crate::brick::Brick

use serde_derive::Deserialize;
use std::fmt;

/// Grid definition. Built through [`Grid::builder`] which
/// guarantees that the tile and chunk sizes are multiples
/// of the resolution.
///
/// - `res` - pixel size in ground units.
///
/// - `tile_size` - edge length of a tile in ground units.
///
/// - `chunk_size` - height of a chunk in ground units.
///
/// - `projection` - projection string (WKT) of the cube.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    res: f64,
    tile_size: f64,
    chunk_size: f64,
    projection: String,

    tile_pixels: usize,
    chunk_rows: usize,
    chunk_count: usize,
}

/// Serialized form of a [`Grid`], as found in configuration
/// files.
#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    pub resolution: f64,
    pub tile_size: f64,
    pub chunk_size: f64,
    #[serde(default)]
    pub projection: String,
}

/// Tile index in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub x: i32,
    pub y: i32,
}

impl TileId {
    pub fn new(x: i32, y: i32) -> Self {
        TileId { x, y }
    }

    /// The tile at the given column and row offset.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        TileId::new(self.x + dx, self.y + dy)
    }
}

/// Formats as the tile's directory name (eg.
/// `X0069_Y0042`).
impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X{:04}_Y{:04}", self.x, self.y)
    }
}

/// The type of item produced by the chunk iterations.
/// Consists of:
///
/// 1. reference to the underlying `Grid`
/// 1. the index of the chunk
/// 1. the pixel row of the tile at which the chunk starts
pub type ChunkWindow<'a> = (&'a Grid, usize, usize);

mod builder;
mod iters;
mod par_iters;

pub use builder::GridBuilder;

impl Grid {
    /// Resolve the chunk `delta` steps (-1, 0 or +1) away
    /// from `chunk` of tile row `tile_y`, wrapping into the
    /// neighbouring tile row past either end of the tile.
    ///
    /// Returns `(chunk, tile_y)` of the neighbour.
    pub fn neighbor_chunk(&self, chunk: usize, tile_y: i32, delta: i32) -> (usize, i32) {
        wrap_chunk(chunk, tile_y, delta, self.chunk_count)
    }
}

#[inline]
fn wrap_chunk(chunk: usize, tile_y: i32, delta: i32, count: usize) -> (usize, i32) {
    let target = chunk as i64 + delta.signum() as i64;
    if target < 0 {
        (count - 1, tile_y - 1)
    } else if target as usize >= count {
        (0, tile_y + 1)
    } else {
        (target as usize, tile_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::builder(10.)
            .with_tile_size(3000.)
            .with_chunk_size(1000.)
            .build()
            .unwrap()
    }

    #[test]
    fn tile_names() {
        assert_eq!(TileId::new(69, 42).to_string(), "X0069_Y0042");
        assert_eq!(TileId::new(-1, 3).to_string(), "X-001_Y0003");
        assert_eq!(TileId::new(69, 42).offset(1, -1), TileId::new(70, 41));
    }

    #[test]
    fn wraps_upward_from_first_chunk() {
        let grid = grid();
        assert_eq!(grid.neighbor_chunk(0, 42, -1), (2, 41));
        assert_eq!(grid.neighbor_chunk(0, 42, 0), (0, 42));
        assert_eq!(grid.neighbor_chunk(0, 42, 1), (1, 42));
    }

    #[test]
    fn wraps_downward_from_last_chunk() {
        let grid = grid();
        let last = grid.chunk_count() - 1;
        assert_eq!(grid.neighbor_chunk(last, 42, 1), (0, 43));
        assert_eq!(grid.neighbor_chunk(last, 42, -1), (last - 1, 42));
    }

    #[test]
    fn single_chunk_tiles_always_wrap() {
        assert_eq!(wrap_chunk(0, 5, -1, 1), (0, 4));
        assert_eq!(wrap_chunk(0, 5, 1, 1), (0, 6));
    }
}
