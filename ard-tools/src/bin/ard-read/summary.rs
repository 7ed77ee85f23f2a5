use serde_derive::Serialize;

use ard_bricks::prelude::*;

/// What was read for one chunk of the tile.
#[derive(Serialize)]
pub struct ChunkSummary {
    pub chunk: usize,
    pub bytes: usize,
    pub items: Vec<ItemSummary>,
}

/// One acquisition (or feature, continuous field, mask) of
/// a chunk.
#[derive(Serialize)]
pub struct ItemSummary {
    pub date: String,
    pub sensor: String,
    pub products: Vec<String>,
    pub bands: usize,
    pub dims: (usize, usize),
    /// Pixels of the first band holding data.
    pub valid: usize,
    /// Ground coordinates of the upper-left corner of the
    /// (padded) chunk.
    pub origin: (f64, f64),
    pub files: usize,
}

impl ItemSummary {
    pub fn of_ard(ard: &Ard) -> Option<Self> {
        let main = ard.dat.as_ref().or_else(|| ard.bricks().next())?;
        let mut summary = ItemSummary::of_brick(main);
        summary.products = ard.bricks().map(|b| b.meta().product.clone()).collect();
        Some(summary)
    }

    pub fn of_brick(brick: &Brick) -> Self {
        let first = brick.bands().first();
        let valid = first
            .map(|b| b.data().values().filter(|&v| v != b.nodata).count())
            .unwrap_or(0);
        let t = brick.chunk_transform();
        ItemSummary {
            date: first.map(|b| b.date.to_string()).unwrap_or_default(),
            sensor: first.map(|b| b.sensor.clone()).unwrap_or_default(),
            products: vec![brick.meta().product.clone()],
            bands: brick.band_count(),
            dims: brick.dims(),
            valid,
            origin: pixel_to_ground(&t, 0., 0.),
            files: brick.meta().provenance.len(),
        }
    }
}
