use nalgebra::{Matrix3, Point2};

use crate::error::IntegrityError;

/// Raster dimensions as `(columns, rows)`.
pub type RasterDims = (usize, usize);
/// Pixel offset as `(x, y)`.
pub type RasterOffset = (isize, isize);

/// GDAL-ordered affine geotransform.
pub type GeoTransform = [f64; 6];
/// Affine map from pixel to ground coordinates, in
/// homogeneous form.
pub type PixelTransform = Matrix3<f64>;

/// Tolerance (in ground units) for a length to count as a
/// multiple of a resolution.
pub const RES_TOLERANCE: f64 = 5e-3;

pub fn transform_from_gdal(t: &GeoTransform) -> PixelTransform {
    Matrix3::new(t[1], t[2], t[0], t[4], t[5], t[3], 0., 0., 1.)
}

pub fn transform_to_gdal(t: &PixelTransform) -> GeoTransform {
    [
        t[(0, 2)],
        t[(0, 0)],
        t[(0, 1)],
        t[(1, 2)],
        t[(1, 0)],
        t[(1, 1)],
    ]
}

/// Ground coordinates of pixel `(x, y)` (corner, not
/// centre) under `t`.
pub fn pixel_to_ground(t: &PixelTransform, x: f64, y: f64) -> (f64, f64) {
    let pt = t.transform_point(&Point2::new(x, y));
    (pt.x, pt.y)
}

/// Verify `value` is a multiple of `res`, within
/// [`RES_TOLERANCE`]. The names are only used to build the
/// error message.
pub fn check_multiple(
    what: &'static str,
    value: f64,
    against: &'static str,
    res: f64,
) -> Result<(), IntegrityError> {
    let rem = value % res;
    if rem.is_nan() || rem > RES_TOLERANCE {
        return Err(IntegrityError::NotMultiple {
            what,
            value,
            against,
            res,
            rem,
            tol: RES_TOLERANCE,
        });
    }
    Ok(())
}

/// Number of pixels of size `res` in `value`. Only
/// meaningful after [`check_multiple`].
#[inline]
pub fn pixels(value: f64, res: f64) -> usize {
    (value / res).round() as usize
}
