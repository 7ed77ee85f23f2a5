//! Point spread function (PSF) aggregation of fine bands
//! to the grid resolution.
//!
//! Reducing a band by plain decimation keeps the response
//! of the fine sensor. The reducer instead convolves the
//! fine band with a Gaussian whose width matches one coarse
//! pixel (see [`kernel`](crate::kernel)), then averages the
//! blurred pixels over each coarse pixel, weighted by the
//! overlapping area.
//!
//! Bands are flat row-major `i16` buffers of the given
//! dimensions, values scaled by [`SCALE`]. Both stages run
//! in parallel over the cells they write.

use rayon::prelude::*;
use std::ops::Range;

use crate::error::ArdResult;
use crate::geometry::RasterDims;
use crate::kernel::psf_kernel;
use ndarray::Array2;

/// Scale of the stored integer values.
pub const SCALE: f64 = 10000.;

/// Blur `hr` (`dims` sized) with `kernel`, skipping
/// neighbours that are nodata or outside the band and
/// normalizing by the weight actually used. Values are
/// unscaled; nodata is `NaN`.
pub fn convolve(hr: &[i16], dims: RasterDims, nodata: i16, kernel: &Array2<f32>) -> Vec<f32> {
    let (nx, ny) = dims;
    debug_assert_eq!(hr.len(), nx * ny);
    let h = (kernel.nrows() / 2) as isize;

    (0..nx * ny)
        .into_par_iter()
        .map(|p| {
            if hr[p] == nodata {
                return f32::NAN;
            }
            let (i, j) = ((p / nx) as isize, (p % nx) as isize);

            let mut sum = 0.;
            let mut num = 0.;
            for ((ki, kj), &w) in kernel.indexed_iter() {
                let ni = i + ki as isize - h;
                let nj = j + kj as isize - h;
                if ni < 0 || nj < 0 || ni >= ny as isize || nj >= nx as isize {
                    continue;
                }
                let v = hr[ni as usize * nx + nj as usize];
                if v == nodata {
                    continue;
                }
                sum += v as f64 / SCALE * w as f64;
                num += w as f64;
            }

            if num > 0. {
                (sum / num) as f32
            } else {
                f32::NAN
            }
        })
        .collect()
}

/// Overlap, along one axis, of fine pixel `n` with coarse
/// pixel `i`, in coarse pixel units.
#[inline]
fn overlap(n: usize, i: usize, r: f64) -> f64 {
    let hi = ((n + 1) as f64 / r - i as f64).min(1.);
    let lo = (n as f64 / r - i as f64).max(0.);
    (hi - lo).max(0.)
}

/// Fine pixels (along one axis, `n` in total) overlapping
/// coarse pixel `i`.
#[inline]
fn footprint(i: usize, r: f64, n: usize) -> Range<usize> {
    let lo = (i as f64 * r).floor() as usize;
    let hi = ((i + 1) as f64 * r).ceil() as usize;
    lo.min(n)..hi.min(n)
}

/// Average the blurred band (`dims` sized) into `lr`
/// (`out_dims` sized), weighting each fine pixel by its
/// overlap with the coarse pixel. Coarse pixels without any
/// valid fine pixel are `nodata`.
pub fn reduce_area(
    blurred: &[f32],
    dims: RasterDims,
    lr: &mut [i16],
    out_dims: RasterDims,
    nodata: i16,
) {
    let (nx, ny) = dims;
    let (cols, rows) = out_dims;
    debug_assert_eq!(blurred.len(), nx * ny);
    debug_assert_eq!(lr.len(), cols * rows);

    let rx = nx as f64 / cols as f64;
    let ry = ny as f64 / rows as f64;

    lr.par_iter_mut().enumerate().for_each(|(p, out)| {
        let (i, j) = (p / cols, p % cols);
        let (rows_in, cols_in) = (footprint(i, ry, ny), footprint(j, rx, nx));

        let mut sum = 0.;
        let mut num = 0.;
        for ni in rows_in {
            let iw = overlap(ni, i, ry);
            for nj in cols_in.clone() {
                let v = blurred[ni * nx + nj];
                if v.is_nan() {
                    continue;
                }
                let w = iw * overlap(nj, j, rx);
                sum += v as f64 * w;
                num += w;
            }
        }

        *out = if num > 0. {
            (sum / num * SCALE).round() as i16
        } else {
            nodata
        };
    });
}

/// Reduce the fine band `hr` into the coarse band `lr`.
/// The kernel is sized on the column ratio of the two.
pub fn reduce_psf(
    hr: &[i16],
    dims: RasterDims,
    lr: &mut [i16],
    out_dims: RasterDims,
    nodata: i16,
) -> ArdResult<()> {
    let r = dims.0 as f32 / out_dims.0 as f32;
    let kernel = psf_kernel(r)?;
    let blurred = convolve(hr, dims, nodata, &kernel);
    reduce_area(&blurred, dims, lr, out_dims, nodata);
    Ok(())
}
