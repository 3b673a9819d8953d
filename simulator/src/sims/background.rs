//! Diffuse background light estimates.
//!
//! The synthesis engine only needs a per-pixel electron rate for the pointing
//! target; how that rate is obtained is up to the [`BackgroundEstimator`].
//!
//! [`ZodiacalBackground`] scales the Leinert et al. (1998) Table 16 zodiacal
//! brightness at 90° solar elongation, given in S10 units (10th magnitude
//! stars per square degree), by the detector's response to a 10th magnitude
//! star and its pixel solid angle.

use shared::algo::misc::interp_clamped;

use crate::hardware::{Detector, DetectorError};
use crate::units::{AngleExt, Wavelength};

/// Obliquity of the ecliptic (J2000), degrees
const OBLIQUITY_DEG: f64 = 23.439_291;

const LEINERT_LATITUDES: [f64; 11] = [
    0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 45.0, 60.0, 75.0, 90.0,
];

// Leinert et al. (1998) Table 16, 90° elongation row, S10 units
const LEINERT_S10_QUADRATURE: [f64; 11] = [
    166.0, 164.0, 154.0, 133.0, 117.0, 104.0, 93.0, 75.0, 64.0, 60.0, 60.0,
];

/// Per-pixel background electron rate for a pointing.
pub trait BackgroundEstimator: Send + Sync {
    /// Expected background in e⁻ s⁻¹ pixel⁻¹ toward `(ra, dec)` degrees
    fn background_rate(&self, ra_deg: f64, dec_deg: f64) -> f64;
}

/// The same background everywhere on the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantBackground {
    pub rate_e_per_s: f64,
}

impl ConstantBackground {
    pub fn new(rate_e_per_s: f64) -> Self {
        Self { rate_e_per_s }
    }
}

impl BackgroundEstimator for ConstantBackground {
    fn background_rate(&self, _ra_deg: f64, _dec_deg: f64) -> f64 {
        self.rate_e_per_s
    }
}

/// Ecliptic latitude in degrees of an equatorial position.
pub fn ecliptic_latitude_deg(ra_deg: f64, dec_deg: f64) -> f64 {
    let (sin_ra, _) = ra_deg.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec_deg.to_radians().sin_cos();
    let (sin_eps, cos_eps) = OBLIQUITY_DEG.to_radians().sin_cos();
    (sin_dec * cos_eps - cos_dec * sin_eps * sin_ra)
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees()
}

/// Zodiacal light at quadrature, scaled to a detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZodiacalBackground {
    /// Electron rate from one 10th magnitude star
    mag10_rate: f64,
    /// Pixel solid angle in square degrees
    pixel_area_deg2: f64,
}

impl ZodiacalBackground {
    /// Calibrate against `detector`, integrating its sensitivity over `band`.
    pub fn for_detector(
        detector: &Detector,
        band: (Wavelength, Wavelength),
    ) -> Result<Self, DetectorError> {
        let mag10_flux = detector.flux_from_magnitude(10.0)?;
        let mag10_rate = mag10_flux * detector.integrated_sensitivity(band.0, band.1);
        let pixel_deg = detector.pixel_scale().as_degrees();
        Ok(Self {
            mag10_rate,
            pixel_area_deg2: pixel_deg * pixel_deg,
        })
    }

    /// Zodiacal brightness in S10 units toward `(ra, dec)`
    pub fn s10(&self, ra_deg: f64, dec_deg: f64) -> f64 {
        let beta = ecliptic_latitude_deg(ra_deg, dec_deg).abs();
        interp_clamped(beta, &LEINERT_LATITUDES, &LEINERT_S10_QUADRATURE).unwrap_or(0.0)
    }
}

impl BackgroundEstimator for ZodiacalBackground {
    fn background_rate(&self, ra_deg: f64, dec_deg: f64) -> f64 {
        self.s10(ra_deg, dec_deg) * self.mag10_rate * self.pixel_area_deg2
    }
}
