//! Pad a brick with the borders of its eight neighbours.
//!
//! Kernel based processing needs pixels beyond the edges of
//! a chunk. [`add_blocks`] extends a brick by `radius` on
//! every side, reading the adjacent strips of the
//! neighbouring chunks from the same product of the
//! neighbouring tiles. Above the first chunk of a tile lies
//! the last chunk of the tile above (and similarly below the
//! last chunk), see [`Grid::neighbor_chunk`].
//!
//! [`Grid::neighbor_chunk`]: crate::grid::Grid::neighbor_chunk

use log::debug;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::block::{read_block, BlockRequest};
use crate::brick::Brick;
use crate::error::{ArdError, ArdResult, IntegrityError};
use crate::geometry::check_multiple;
use crate::grid::TileId;
use crate::source::RasterOpener;

/// Replace the directory component naming `from` by `to`.
pub fn neighbor_path(path: &Path, from: TileId, to: TileId) -> ArdResult<PathBuf> {
    let from = from.to_string();
    let to = to.to_string();

    let mut found = false;
    let rewritten = path
        .components()
        .map(|c| match c {
            Component::Normal(name) if !found && name == OsStr::new(&from) => {
                found = true;
                Component::Normal(OsStr::new(&to))
            }
            c => c,
        })
        .collect::<PathBuf>();

    if found {
        Ok(rewritten)
    } else {
        Err(ArdError::NeighborPath { path: path.into() })
    }
}

/// Columns (or rows) covered by the strip of the neighbour
/// in direction `dir`, and the offset of the strip in the
/// padded band.
#[inline]
fn strip(dir: i32, pix: usize, inner: usize) -> (usize, usize) {
    match dir {
        d if d < 0 => (pix, 0),
        0 => (inner, pix),
        _ => (pix, inner + pix),
    }
}

/// Pad `centre`, the brick read for `req`, with `radius`
/// (ground units) of its neighbours. Neighbours whose file
/// does not exist are filled with nodata; failing to read
/// an existing neighbour fails the whole brick.
pub fn add_blocks<O: RasterOpener>(
    opener: &O,
    req: &BlockRequest,
    radius: f64,
    centre: Brick,
) -> ArdResult<Brick> {
    if !(radius > 0.) {
        return Err(IntegrityError::Radius(radius).into());
    }
    let grid = req.grid();
    check_multiple("radius", radius, "resolution", grid.res())?;

    let pix = (radius / grid.res()).floor() as usize;
    if pix == 0 {
        return Err(IntegrityError::Radius(radius).into());
    }
    let (cx, cy) = centre.dims();
    let (nx, ny) = (cx + 2 * pix, cy + 2 * pix);
    debug!(
        "padding {}x{} brick by {} pixels to {}x{}",
        cx, cy, pix, nx, ny
    );

    let mut padded = centre.copy_layout_sized(centre.band_count(), (nx, ny), req.sample());
    padded.meta_mut().chunk_dims = (nx, ny);

    let tile = req.tile();
    for block_i in -1..=1i32 {
        for block_j in -1..=1i32 {
            let (cols, j_off) = strip(block_j, pix, cx);
            let (rows, i_off) = strip(block_i, pix, cy);

            if block_i == 0 && block_j == 0 {
                for (b, band) in centre.bands().iter().enumerate() {
                    padded.band_mut(b).data_mut().paste(band.data(), (j_off, i_off))?;
                }
                continue;
            }

            let (chunk, tile_y) = grid.neighbor_chunk(req.chunk(), tile.y, block_i);
            let neighbor = TileId::new(tile.x + block_j, tile_y);
            let path = neighbor_path(req.path(), tile, neighbor)?;

            if !opener.exists(&path) {
                debug!("no neighbour {}, filling nodata", path.display());
                for b in 0..padded.band_count() {
                    padded
                        .band_mut(b)
                        .data_mut()
                        .fill_window((j_off, i_off), (cols, rows), req.nodata());
                }
                continue;
            }

            let strip_req = req
                .at(&path, chunk)
                .with_partial(block_j as f64 * radius, block_i as f64 * radius);
            let add = read_block(opener, &strip_req)?;
            for b in 0..padded.band_count().min(add.band_count()) {
                padded
                    .band_mut(b)
                    .data_mut()
                    .paste(add.band(b).data(), (j_off, i_off))?;
            }
        }
    }

    Ok(padded)
}
