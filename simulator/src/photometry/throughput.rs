//! Optical throughput from a tabulated dichroic transmission curve.
//!
//! The light path reflects or transmits through the dichroic coating on two
//! surfaces before reaching a detector, so the tabulated single-surface
//! transmission is squared and then scaled by the efficiency of the remaining
//! optics.

use shared::algo::misc::{interp_clamped, validate_table, InterpError};

use crate::units::{LengthExt, Wavelength};

/// Efficiency of the optical train excluding the dichroic surfaces
pub const OPTICS_EFFICIENCY: f64 = 0.71;

/// Number of dichroic surfaces in the light path
pub const DICHROIC_SURFACES: i32 = 2;

/// Wavelength-dependent fractional throughput.
#[derive(Debug, Clone)]
pub struct Throughput {
    /// Wavelengths in nanometers, ascending
    wavelengths_nm: Vec<f64>,
    /// Single-surface transmission in percent
    transmission_pct: Vec<f64>,
    surfaces: i32,
    efficiency: f64,
}

impl Throughput {
    /// Build a throughput curve from a dichroic transmission table in percent.
    ///
    /// Uses the default two-surface path and [`OPTICS_EFFICIENCY`].
    pub fn from_dichroic_table(
        wavelengths_nm: Vec<f64>,
        transmission_pct: Vec<f64>,
    ) -> Result<Self, InterpError> {
        validate_table(&wavelengths_nm, &transmission_pct)?;
        Ok(Self {
            wavelengths_nm,
            transmission_pct,
            surfaces: DICHROIC_SURFACES,
            efficiency: OPTICS_EFFICIENCY,
        })
    }

    /// Override the number of dichroic surfaces and the residual efficiency.
    pub fn with_path(mut self, surfaces: i32, efficiency: f64) -> Self {
        self.surfaces = surfaces;
        self.efficiency = efficiency;
        self
    }

    /// Fractional throughput in [0, 1] at `wavelength`.
    ///
    /// The table edges are held beyond its range. Non-finite wavelengths give
    /// zero throughput.
    pub fn at(&self, wavelength: Wavelength) -> f64 {
        let pct = interp_clamped(
            wavelength.as_nanometers(),
            &self.wavelengths_nm,
            &self.transmission_pct,
        )
        .unwrap_or(0.0);

        let single = (pct / 100.0).clamp(0.0, 1.0);
        let value = single.powi(self.surfaces) * self.efficiency;
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> Throughput {
        Throughput::from_dichroic_table(vec![400.0, 600.0, 800.0], vec![50.0, 90.0, 10.0]).unwrap()
    }

    #[test]
    fn test_squares_and_scales() {
        let t = curve();
        // 90% twice, times 0.71
        assert_relative_eq!(
            t.at(Wavelength::from_nanometers(600.0)),
            0.81 * 0.71,
            epsilon = 1e-12
        );
        // midpoint 70%
        assert_relative_eq!(
            t.at(Wavelength::from_nanometers(500.0)),
            0.49 * 0.71,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_edges_are_held() {
        let t = curve();
        assert_relative_eq!(
            t.at(Wavelength::from_nanometers(100.0)),
            0.25 * 0.71,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            t.at(Wavelength::from_micrometers(3.0)),
            0.01 * 0.71,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_nan_wavelength_is_zero() {
        assert_eq!(curve().at(Wavelength::from_nanometers(f64::NAN)), 0.0);
    }

    #[test]
    fn test_custom_path() {
        let t = curve().with_path(1, 1.0);
        assert_relative_eq!(
            t.at(Wavelength::from_nanometers(600.0)),
            0.9,
            epsilon = 1e-12
        );
    }
}
