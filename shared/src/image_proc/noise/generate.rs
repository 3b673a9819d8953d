//! Noise generation utilities for detector simulation.
//!
//! Provides the sampling primitives used to turn expected electron counts
//! into realistic detector frames:
//!
//! - Poisson photon sampling that tolerates zero and non-finite means
//! - Masked per-frame read noise (Gaussian about a bias level) plus dark
//!   current (Poisson), applied only to illuminated pixels

use ndarray::{ArrayView2, ArrayViewMut2, Zip};
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use thiserror::Error;

/// Errors raised when noise distribution parameters are unusable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NoiseError {
    #[error("Read noise must be finite and non-negative, got {0}")]
    InvalidReadNoise(f64),
    #[error("Dark electron mean must be finite and non-negative, got {0}")]
    InvalidDarkMean(f64),
    #[error("Bias level must be finite, got {0}")]
    InvalidBias(f64),
    #[error("Mask shape {mask:?} does not match frame shape {frame:?}")]
    ShapeMismatch {
        mask: (usize, usize),
        frame: (usize, usize),
    },
}

/// Draw a Poisson sample with the given mean.
///
/// Means that are zero, negative or non-finite yield zero counts; those arise
/// from PSF wings and masked regions and are not errors.
pub fn sample_poisson<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> f64 {
    if !(mean.is_finite() && mean > 0.0) {
        return 0.0;
    }
    match Poisson::new(mean) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}

/// Add one frame's worth of read noise and dark current to illuminated pixels.
///
/// Each pixel where `mask` is true receives
/// `Normal(bias, read_noise) + Poisson(dark_mean)` electrons. Pixels outside
/// the mask are left untouched.
///
/// # Arguments
/// * `frame` - Frame to modify in place, `(rows, cols)`
/// * `mask` - Illumination mask with the same shape as `frame`
/// * `bias` - Mean of the read-noise distribution in electrons
/// * `read_noise` - Standard deviation of the read noise in electrons
/// * `dark_mean` - Expected dark electrons per pixel for the frame
/// * `rng` - Random source for this frame
pub fn add_masked_read_and_dark_noise<R: Rng + ?Sized>(
    mut frame: ArrayViewMut2<f64>,
    mask: ArrayView2<bool>,
    bias: f64,
    read_noise: f64,
    dark_mean: f64,
    rng: &mut R,
) -> Result<(), NoiseError> {
    if frame.dim() != mask.dim() {
        return Err(NoiseError::ShapeMismatch {
            mask: mask.dim(),
            frame: frame.dim(),
        });
    }
    if !bias.is_finite() {
        return Err(NoiseError::InvalidBias(bias));
    }
    if !(read_noise.is_finite() && read_noise >= 0.0) {
        return Err(NoiseError::InvalidReadNoise(read_noise));
    }
    if !(dark_mean.is_finite() && dark_mean >= 0.0) {
        return Err(NoiseError::InvalidDarkMean(dark_mean));
    }

    let read_dist =
        Normal::new(bias, read_noise).map_err(|_| NoiseError::InvalidReadNoise(read_noise))?;

    Zip::from(&mut frame).and(&mask).for_each(|pixel, &lit| {
        if lit {
            *pixel += read_dist.sample(rng) + sample_poisson(dark_mean, rng);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_poisson_degenerate_means() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_poisson(0.0, &mut rng), 0.0);
        assert_eq!(sample_poisson(-3.0, &mut rng), 0.0);
        assert_eq!(sample_poisson(f64::NAN, &mut rng), 0.0);
        assert_eq!(sample_poisson(f64::INFINITY, &mut rng), 0.0);
    }

    #[test]
    fn test_sample_poisson_mean() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| sample_poisson(12.5, &mut rng)).sum::<f64>() / n as f64;
        assert_relative_eq!(mean, 12.5, epsilon = 0.15);
    }

    #[test]
    fn test_masked_noise_leaves_dark_pixels_alone() {
        let mut frame = Array2::<f64>::zeros((64, 64));
        let mask = Array2::from_shape_fn((64, 64), |(r, _)| r < 32);
        let mut rng = StdRng::seed_from_u64(9);

        add_masked_read_and_dark_noise(frame.view_mut(), mask.view(), 100.0, 2.0, 4.0, &mut rng)
            .unwrap();

        let lit: Vec<f64> = frame
            .indexed_iter()
            .filter(|((r, _), _)| *r < 32)
            .map(|(_, v)| *v)
            .collect();
        let unlit_sum: f64 = frame
            .indexed_iter()
            .filter(|((r, _), _)| *r >= 32)
            .map(|(_, v)| *v)
            .sum();

        assert_eq!(unlit_sum, 0.0);
        let lit_mean = lit.iter().sum::<f64>() / lit.len() as f64;
        // bias + dark mean
        assert_relative_eq!(lit_mean, 104.0, epsilon = 0.3);
    }

    #[test]
    fn test_masked_noise_rejects_bad_parameters() {
        let mut frame = Array2::<f64>::zeros((4, 4));
        let mask = Array2::from_elem((4, 4), true);
        let wrong_mask = Array2::from_elem((3, 4), true);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            add_masked_read_and_dark_noise(
                frame.view_mut(),
                mask.view(),
                0.0,
                -1.0,
                0.0,
                &mut rng
            ),
            Err(NoiseError::InvalidReadNoise(-1.0))
        );
        assert_eq!(
            add_masked_read_and_dark_noise(
                frame.view_mut(),
                mask.view(),
                0.0,
                1.0,
                -2.0,
                &mut rng
            ),
            Err(NoiseError::InvalidDarkMean(-2.0))
        );
        assert!(matches!(
            add_masked_read_and_dark_noise(
                frame.view_mut(),
                wrong_mask.view(),
                0.0,
                1.0,
                1.0,
                &mut rng
            ),
            Err(NoiseError::ShapeMismatch { .. })
        ));
    }
}
