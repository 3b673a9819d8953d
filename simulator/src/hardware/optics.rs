//! Telescope optics and PSF width model.
//!
//! The PSF core is approximated by a Gaussian whose FWHM is the quadrature sum
//! of three terms:
//!
//! - **Diffraction**: FWHM ≈ 1.028 λ/D for an unobstructed circular aperture
//! - **Static blur**: fixed wavefront error and pointing smear
//! - **Thermal defocus**: grows linearly with |T − T₀| away from the focus
//!   temperature

use std::f64::consts::PI;

use crate::image_proc::prf::{GaussianPrf, PrfError};
use crate::units::{
    Angle, AngleExt, Length, LengthExt, Temperature, TemperatureExt, Wavelength,
};

/// Ratio of the Airy core FWHM to λ/D
const AIRY_FWHM_FACTOR: f64 = 1.028;

/// Telescope optical configuration shared by both detectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Optics {
    /// Clear aperture diameter of the primary mirror
    pub mirror_diameter: Length,
    /// Temperature at which the telescope is in best focus
    pub nominal_temperature: Temperature,
    /// Temperature-independent blur FWHM
    pub static_blur: Angle,
    /// Additional blur FWHM per kelvin away from `nominal_temperature`
    pub thermal_defocus_per_kelvin: Angle,
}

impl Optics {
    /// The Pandora 0.44 m telescope
    pub fn pandora() -> Self {
        Self {
            mirror_diameter: Length::from_meters(0.44),
            nominal_temperature: Temperature::from_celsius(10.0),
            static_blur: Angle::from_arcseconds(1.5),
            thermal_defocus_per_kelvin: Angle::from_arcseconds(0.02),
        }
    }

    /// Geometric collecting area π(D/2)² in cm²
    pub fn collecting_area_cm2(&self) -> f64 {
        PI * (self.mirror_diameter.as_centimeters() / 2.0).powi(2)
    }

    /// Diffraction-limited FWHM at `wavelength`
    pub fn diffraction_fwhm(&self, wavelength: Wavelength) -> Angle {
        let ratio = wavelength.as_meters() / self.mirror_diameter.as_meters();
        Angle::from_radians(AIRY_FWHM_FACTOR * ratio)
    }

    /// Total PSF FWHM at `wavelength` and telescope `temperature`
    pub fn psf_fwhm(&self, wavelength: Wavelength, temperature: Temperature) -> Angle {
        let diffraction = self.diffraction_fwhm(wavelength).as_arcseconds();
        let blur = self.static_blur.as_arcseconds();
        let delta_k = (temperature.as_kelvin() - self.nominal_temperature.as_kelvin()).abs();
        let defocus = self.thermal_defocus_per_kelvin.as_arcseconds() * delta_k;

        Angle::from_arcseconds((diffraction.powi(2) + blur.powi(2) + defocus.powi(2)).sqrt())
    }

    /// Build the fast pixel response for a detector with `pixel_scale` per pixel.
    pub fn fast_prf(
        &self,
        wavelength: Wavelength,
        temperature: Temperature,
        pixel_scale: Angle,
    ) -> Result<GaussianPrf, PrfError> {
        let fwhm_arcsec = self.psf_fwhm(wavelength, temperature).as_arcseconds();
        let fwhm_px = fwhm_arcsec / pixel_scale.as_arcseconds();
        GaussianPrf::from_fwhm(fwhm_px)
    }
}
