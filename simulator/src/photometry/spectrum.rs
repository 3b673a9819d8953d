//! Reference spectra and photon-energy helpers in CGS units.
//!
//! Spectral flux densities are expressed per unit wavelength,
//! erg s⁻¹ cm⁻² Å⁻¹, with wavelength grids sampled in ångströms. This is the
//! convention of the Vega reference spectrum the instrument zeropoints are
//! calibrated against.

use shared::algo::misc::{interp_clamped, validate_table, InterpError};

use crate::units::{LengthExt, Wavelength};

/// Physical constants in CGS units.
pub struct CGS {}

impl CGS {
    /// Planck's constant, erg s
    pub const PLANCK_CONSTANT: f64 = 6.62607015e-27;

    /// Speed of light in vacuum, cm/s
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e10;

    /// Boltzmann constant, erg/K
    pub const BOLTZMANN_CONSTANT: f64 = 1.380649e-16;
}

/// Vega's monochromatic flux density at 5500 Å, erg s⁻¹ cm⁻² Å⁻¹
pub const VEGA_FLUX_5500: f64 = 3.63e-9;

/// Effective temperature used for the Vega-like blackbody reference
pub const VEGA_TEMPERATURE_K: f64 = 9550.0;

/// Energy of a single photon at `wavelength`, in erg.
///
/// Non-positive wavelengths have no physical photon energy and return
/// infinity, which drives any photon rate computed from it to zero.
pub fn photon_energy(wavelength: Wavelength) -> f64 {
    let wavelength_cm = wavelength.as_centimeters();
    if !(wavelength_cm > 0.0) {
        return f64::INFINITY;
    }
    CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT / wavelength_cm
}

/// Planck spectral radiance per unit wavelength (arbitrary normalization)
fn planck_lambda(wavelength_cm: f64, temperature_k: f64) -> f64 {
    let lambda_kt = wavelength_cm * CGS::BOLTZMANN_CONSTANT * temperature_k;
    let exponent = CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT / lambda_kt;
    1.0 / (wavelength_cm.powi(5) * exponent.exp_m1())
}

/// A tabulated spectral energy distribution.
///
/// Wavelengths are stored in ångströms and flux densities in
/// erg s⁻¹ cm⁻² Å⁻¹. The table is treated as an immutable lookup once built.
#[derive(Debug, Clone)]
pub struct ReferenceSpectrum {
    wavelengths_aa: Vec<f64>,
    flux_density: Vec<f64>,
}

impl ReferenceSpectrum {
    /// Build a spectrum from a wavelength (Å) / flux-density table.
    pub fn from_table(
        wavelengths_aa: Vec<f64>,
        flux_density: Vec<f64>,
    ) -> Result<Self, InterpError> {
        validate_table(&wavelengths_aa, &flux_density)?;
        Ok(Self {
            wavelengths_aa,
            flux_density,
        })
    }

    /// A Vega-like reference: a 9550 K blackbody normalized to Vega's flux at 5500 Å.
    ///
    /// Sampled every 10 Å from 900 Å to 30000 Å, which spans both detectors'
    /// sensitivity curves.
    pub fn vega_like() -> Self {
        let reference = planck_lambda(5500.0e-8, VEGA_TEMPERATURE_K);
        let wavelengths_aa: Vec<f64> = (90..=3000).map(|i| i as f64 * 10.0).collect();
        let flux_density = wavelengths_aa
            .iter()
            .map(|&aa| VEGA_FLUX_5500 * planck_lambda(aa * 1e-8, VEGA_TEMPERATURE_K) / reference)
            .collect();

        Self {
            wavelengths_aa,
            flux_density,
        }
    }

    /// Wavelength grid in ångströms
    pub fn wavelengths_aa(&self) -> &[f64] {
        &self.wavelengths_aa
    }

    /// Flux density samples, erg s⁻¹ cm⁻² Å⁻¹
    pub fn flux_density(&self) -> &[f64] {
        &self.flux_density
    }

    /// Flux density at an arbitrary wavelength, holding the table edges.
    pub fn flux_density_at(&self, wavelength: Wavelength) -> f64 {
        interp_clamped(
            wavelength.as_angstroms(),
            &self.wavelengths_aa,
            &self.flux_density,
        )
        .unwrap_or(0.0)
    }
}
