//! Pixel response functions.
//!
//! A pixel response function (PRF) is the point spread function integrated
//! over each detector pixel. Evaluating it at a source position yields a small
//! footprint of integer pixel offsets and the fraction of the source flux that
//! lands in each of them.
//!
//! Pixel `i` is centred on coordinate `i` and spans `[i - 0.5, i + 0.5)`, the
//! same 0-indexed convention used by the world-coordinate transform.

use ndarray::Array2;
use scilib::math::basic::erf;
use std::f64::consts::SQRT_2;
use thiserror::Error;

/// Errors raised when constructing a pixel response
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrfError {
    #[error("PSF width must be finite, positive and at most 64 pixels, got {0}")]
    InvalidWidth(f64),
}

/// Local footprint of a point source on the pixel grid.
///
/// `weights[[r, c]]` is the flux fraction landing on pixel
/// `(rows[r], columns[c])`, with offsets relative to the evaluation origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PrfFootprint {
    pub columns: Vec<i64>,
    pub rows: Vec<i64>,
    pub weights: Array2<f64>,
}

impl PrfFootprint {
    /// Iterate `(row_offset, col_offset, weight)` over the footprint
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64, f64)> + '_ {
        self.weights
            .indexed_iter()
            .map(move |((r, c), &w)| (self.rows[r], self.columns[c], w))
    }
}

/// A fast evaluator of a discretized PSF.
pub trait PixelResponse: Send + Sync {
    /// Footprint of a source at sub-pixel position `(x, y)` relative to the origin.
    fn evaluate(&self, x: f64, y: f64) -> PrfFootprint;
}

/// Widest Gaussian accepted, in pixels; keeps footprints bounded
pub const MAX_SIGMA_PX: f64 = 64.0;

/// Circular Gaussian PSF integrated analytically over square pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPrf {
    sigma_px: f64,
    half_width: i64,
}

impl GaussianPrf {
    /// Build from the Gaussian standard deviation in pixels.
    ///
    /// The footprint extends `ceil(5σ) + 1` pixels each side of the pixel
    /// containing the source. Widths above [`MAX_SIGMA_PX`] are rejected.
    pub fn new(sigma_px: f64) -> Result<Self, PrfError> {
        if !(sigma_px.is_finite() && sigma_px > 0.0 && sigma_px <= MAX_SIGMA_PX) {
            return Err(PrfError::InvalidWidth(sigma_px));
        }
        Ok(Self {
            sigma_px,
            half_width: (5.0 * sigma_px).ceil() as i64 + 1,
        })
    }

    /// Build from the full width at half maximum in pixels.
    pub fn from_fwhm(fwhm_px: f64) -> Result<Self, PrfError> {
        Self::new(fwhm_px / (2.0 * (2.0 * 2f64.ln()).sqrt()))
    }

    pub fn sigma_px(&self) -> f64 {
        self.sigma_px
    }

    /// Flux fraction per pixel along one axis
    fn axis_weights(&self, center: f64, offsets: &[i64]) -> Vec<f64> {
        let scale = self.sigma_px * SQRT_2;
        offsets
            .iter()
            .map(|&i| {
                let lo = (i as f64 - 0.5 - center) / scale;
                let hi = (i as f64 + 0.5 - center) / scale;
                // erf is approximate in the tails and can dip below zero there
                (0.5 * (erf(hi) - erf(lo))).max(0.0)
            })
            .collect()
    }
}

impl PixelResponse for GaussianPrf {
    fn evaluate(&self, x: f64, y: f64) -> PrfFootprint {
        let xc = x.round() as i64;
        let yc = y.round() as i64;
        let columns: Vec<i64> = (xc - self.half_width..=xc + self.half_width).collect();
        let rows: Vec<i64> = (yc - self.half_width..=yc + self.half_width).collect();

        // Separable: the 2D integral is the outer product of the axis integrals
        let wx = self.axis_weights(x, &columns);
        let wy = self.axis_weights(y, &rows);
        let mut weights =
            Array2::from_shape_fn((rows.len(), columns.len()), |(r, c)| wy[r] * wx[c]);

        let total = weights.sum();
        if total > 0.0 {
            weights /= total;
        }

        PrfFootprint {
            columns,
            rows,
            weights,
        }
    }
}
