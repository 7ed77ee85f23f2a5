//! Gaussian lowpass kernels approximating the point spread
//! function of a coarser sensor.

use ndarray::Array2;

use crate::error::ArdError;

/// Full width at half maximum of a unit Gaussian.
const FWHM_PER_SIGMA: f32 = 2.354_82;

/// Kernel size for a fine to coarse pixel ratio `r`: twice
/// the ratio, bumped to the next odd size.
pub fn kernel_size(r: f32) -> usize {
    let nk = (r * 2.).round().max(1.) as usize;
    if nk % 2 == 0 {
        nk + 1
    } else {
        nk
    }
}

/// Standard deviation of a Gaussian whose full width at
/// half maximum spans one coarse pixel (`r` fine pixels).
pub fn find_sigma(r: f32) -> f32 {
    r / FWHM_PER_SIGMA
}

/// Square `nk x nk` Gaussian kernel, normalized to unit
/// sum.
pub fn gauss_kernel(nk: usize, sigma: f32) -> Result<Array2<f32>, ArdError> {
    if nk == 0 || nk % 2 == 0 {
        return Err(ArdError::Kernel(format!("kernel size {} is not odd", nk)));
    }
    if !sigma.is_finite() || sigma <= 0. {
        return Err(ArdError::Kernel(format!("invalid sigma {}", sigma)));
    }

    let h = (nk / 2) as f32;
    let denom = 2. * sigma * sigma;
    let mut kernel = Array2::from_shape_fn((nk, nk), |(i, j)| {
        let y = i as f32 - h;
        let x = j as f32 - h;
        (-(x * x + y * y) / denom).exp()
    });

    let sum = kernel.sum();
    if !(sum > 0.) {
        return Err(ArdError::Kernel(format!("degenerate kernel, sum {}", sum)));
    }
    kernel /= sum;
    Ok(kernel)
}

/// Kernel for a fine to coarse pixel ratio `r`.
pub fn psf_kernel(r: f32) -> Result<Array2<f32>, ArdError> {
    gauss_kernel(kernel_size(r), find_sigma(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_odd() {
        assert_eq!(kernel_size(2.), 5);
        assert_eq!(kernel_size(3.), 7);
        assert_eq!(kernel_size(1.5), 3);
        assert_eq!(kernel_size(0.1), 1);
    }

    #[test]
    fn normalized_and_symmetric() {
        let k = psf_kernel(3.).unwrap();
        assert_eq!(k.dim(), (7, 7));
        assert!((k.sum() - 1.).abs() < 1e-5);
        assert_eq!(k[(0, 1)], k[(1, 0)]);
        assert_eq!(k[(0, 0)], k[(6, 6)]);
        let peak = k[(3, 3)];
        assert!(k.iter().all(|&w| w <= peak && w > 0.));
    }

    #[test]
    fn invalid_parameters() {
        assert!(gauss_kernel(4, 1.).is_err());
        assert!(gauss_kernel(5, 0.).is_err());
        assert!(gauss_kernel(5, f32::NAN).is_err());
    }
}
