//! Abstractions over the raster library.
//!
//! The readers only need to open a file, query its
//! geotransform and band count, and read a window of a band
//! resampled to a given size. [`RasterOpener`] and
//! [`RasterSource`] capture exactly that; the GDAL
//! implementation is behind the (default) `gdal` feature.

use std::path::Path;

use crate::geometry::{GeoTransform, RasterDims, RasterOffset};
use crate::Result;

/// An open raster file. Dropped to close.
pub trait RasterSource {
    fn geo_transform(&self) -> Result<GeoTransform>;

    fn band_count(&self) -> usize;

    fn projection(&self) -> String;

    /// Read the `window` of 1-based `band` at `off` into
    /// `out`, resampled (nearest neighbour) to `out_size`.
    /// `out` holds `out_size.0 * out_size.1` values.
    fn read_window(
        &self,
        band: usize,
        off: RasterOffset,
        window: RasterDims,
        out_size: RasterDims,
        out: &mut [i16],
    ) -> Result<()>;
}

/// Opens raster files. Shared by the worker threads of the
/// batch readers; every read opens its own source.
pub trait RasterOpener: Sync {
    type Source: RasterSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(feature = "gdal")]
pub use self::gdal_source::{GdalOpener, GdalSource};

#[cfg(feature = "gdal")]
mod gdal_source {
    use anyhow::{format_err, Context};
    use gdal::Dataset;
    use std::path::Path;

    use super::{RasterOpener, RasterSource};
    use crate::geometry::{GeoTransform, RasterDims, RasterOffset};
    use crate::Result;

    /// Opens files with GDAL.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct GdalOpener;

    /// A GDAL dataset. `Send` but not `Sync`.
    pub struct GdalSource(pub Dataset);

    impl RasterOpener for GdalOpener {
        type Source = GdalSource;

        fn open(&self, path: &Path) -> Result<GdalSource> {
            Ok(GdalSource(
                Dataset::open(path).with_context(|| format!("opening {}", path.display()))?,
            ))
        }
    }

    impl RasterSource for GdalSource {
        fn geo_transform(&self) -> Result<GeoTransform> {
            Ok(self.0.geo_transform()?)
        }

        fn band_count(&self) -> usize {
            self.0.raster_count() as usize
        }

        fn projection(&self) -> String {
            self.0.projection()
        }

        fn read_window(
            &self,
            band: usize,
            off: RasterOffset,
            window: RasterDims,
            out_size: RasterDims,
            out: &mut [i16],
        ) -> Result<()> {
            let band = self.0.rasterband(band as isize)?;
            Ok(band
                .read_into_slice(off, window, out_size, out, None)
                .with_context(|| {
                    format_err!(
                        "reading window @ ({},{}) of dimension ({}x{}) into ({}x{})",
                        off.0,
                        off.1,
                        window.0,
                        window.1,
                        out_size.0,
                        out_size.1
                    )
                })?)
        }
    }

}
