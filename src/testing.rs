//! In-memory rasters for the unit tests.

use anyhow::{bail, format_err};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::geometry::{GeoTransform, RasterDims, RasterOffset};
use crate::source::{RasterOpener, RasterSource};
use crate::Result;

#[derive(Clone, Debug)]
pub struct MemRaster {
    pub geo_transform: GeoTransform,
    pub bands: Vec<Array2<i16>>,
}

impl MemRaster {
    /// Raster with pixel size `res` at `(1000, 5000)` whose
    /// bands are computed by `f(band, row, col)`.
    pub fn from_fn<F: Fn(usize, usize, usize) -> i16>(
        res: f64,
        dims: RasterDims,
        band_count: usize,
        f: F,
    ) -> Self {
        MemRaster {
            geo_transform: [1000., res, 0., 5000., 0., -res],
            bands: (1..=band_count)
                .map(|b| Array2::from_shape_fn((dims.1, dims.0), |(i, j)| f(b, i, j)))
                .collect(),
        }
    }

    pub fn constant(res: f64, dims: RasterDims, band_count: usize, value: i16) -> Self {
        MemRaster::from_fn(res, dims, band_count, |_, _, _| value)
    }
}

/// Opener serving [`MemRaster`]s by path. Counts the opens.
#[derive(Default)]
pub struct MemOpener {
    files: HashMap<PathBuf, MemRaster>,
    opens: AtomicUsize,
}

impl MemOpener {
    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, raster: MemRaster) {
        self.files.insert(path.into(), raster);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl RasterOpener for MemOpener {
    type Source = MemRaster;

    fn open(&self, path: &Path) -> Result<MemRaster> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| format_err!("no such file"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Emulates nearest neighbour decimation and replication
/// of the raster library: output pixel `i` samples input
/// pixel `off + floor((i + 0.5) * window / out)`.
impl RasterSource for MemRaster {
    fn geo_transform(&self) -> Result<GeoTransform> {
        Ok(self.geo_transform)
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn projection(&self) -> String {
        "EPSG:3035".into()
    }

    fn read_window(
        &self,
        band: usize,
        off: RasterOffset,
        window: RasterDims,
        out_size: RasterDims,
        out: &mut [i16],
    ) -> Result<()> {
        let data = match band.checked_sub(1).and_then(|b| self.bands.get(b)) {
            Some(data) => data,
            None => bail!("no band {}", band),
        };
        let (rows, cols) = data.dim();
        if off.0 < 0
            || off.1 < 0
            || off.0 as usize + window.0 > cols
            || off.1 as usize + window.1 > rows
        {
            bail!("window {:?} {:?} out of bounds", off, window);
        }

        let sample =
            |i: usize, n: usize, w: usize| ((i as f64 + 0.5) * w as f64 / n as f64) as usize;
        for i in 0..out_size.1 {
            let si = off.1 as usize + sample(i, out_size.1, window.1);
            for j in 0..out_size.0 {
                let sj = off.0 as usize + sample(j, out_size.0, window.0);
                out[i * out_size.0 + j] = data[(si, sj)];
            }
        }
        Ok(())
    }
}
