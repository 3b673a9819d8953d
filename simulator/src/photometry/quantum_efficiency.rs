//! Quantum efficiency models for the Pandora detectors.
//!
//! Two representations are supported:
//!
//! - **Polynomial**: a cubic in wavelength (µm) valid in a central band, with
//!   independent exponential roll-offs beyond a red and a blue cutoff. This is
//!   how the NIR HgCdTe response is modelled.
//! - **Tabulated**: a measured curve interpolated linearly, zero outside the
//!   measured range. Used for detectors whose QE ships as a lookup table.
//!
//! Both clamp values below [`QE_FLOOR`] (and any NaN/inf produced at extreme
//! wavelengths) to exactly zero, so QE is always finite and non-negative.

use thiserror::Error;

use crate::units::{LengthExt, Wavelength};

/// QE values below this threshold are treated as numerical noise and zeroed
pub const QE_FLOOR: f64 = 1e-5;

/// Errors that can occur while building a quantum efficiency model
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumEfficiencyError {
    #[error("Wavelength and efficiency vectors must have the same length")]
    LengthMismatch,

    #[error("QE table needs at least two samples")]
    TooFewSamples,

    #[error("Wavelengths must be in ascending order")]
    NotAscending,

    #[error("Efficiency values must be between 0.0 and 1.0")]
    OutOfRange,

    #[error("Cutoff decay rates must be finite and positive")]
    InvalidDecay,
}

/// Cubic QE with exponential roll-offs outside `[blue_cutoff_um, red_cutoff_um]`.
///
/// QE(λ) = c₀ + c₁λ + c₂λ² + c₃λ³ for λ in µm, multiplied by
/// `exp(-(λ - red) * red_decay)` above the red cutoff and by
/// `exp(-(blue - λ) * blue_decay)` below the blue cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialQe {
    pub coefficients: [f64; 4],
    pub red_cutoff_um: f64,
    pub blue_cutoff_um: f64,
    /// Decay rate beyond the red cutoff, per µm
    pub red_decay: f64,
    /// Decay rate beyond the blue cutoff, per µm
    pub blue_decay: f64,
}

impl PolynomialQe {
    /// Short-wave HgCdTe response tuned for the Pandora NIR channel
    pub fn pandora_nir() -> Self {
        Self {
            coefficients: [0.65830, -0.05668, 0.25580, -0.08350],
            red_cutoff_um: 1.69,
            blue_cutoff_um: 0.75,
            red_decay: 100.0,
            blue_decay: 100.0 / 1.5,
        }
    }

    fn evaluate_um(&self, um: f64) -> f64 {
        let [c0, c1, c2, c3] = self.coefficients;
        let mut qe = c0 + um * (c1 + um * (c2 + um * c3));

        if um > self.red_cutoff_um {
            qe *= ((self.red_cutoff_um - um) * self.red_decay).exp();
        }
        if um < self.blue_cutoff_um {
            qe *= (-(self.blue_cutoff_um - um) * self.blue_decay).exp();
        }
        qe
    }
}

/// Wavelength-dependent quantum efficiency of a detector.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumEfficiency {
    Polynomial(PolynomialQe),
    Tabulated {
        /// Wavelengths in nanometers, ascending
        wavelengths_nm: Vec<f64>,
        /// Efficiency values (0.0 to 1.0)
        efficiencies: Vec<f64>,
    },
}

impl QuantumEfficiency {
    /// Create a polynomial QE model after checking the decay rates.
    pub fn polynomial(model: PolynomialQe) -> Result<Self, QuantumEfficiencyError> {
        let valid = |rate: f64| rate.is_finite() && rate > 0.0;
        if !valid(model.red_decay) || !valid(model.blue_decay) {
            return Err(QuantumEfficiencyError::InvalidDecay);
        }
        Ok(Self::Polynomial(model))
    }

    /// Create a tabulated QE model from wavelength (nm) and efficiency tables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The vectors have different lengths or fewer than two samples
    /// - Wavelengths are not strictly ascending
    /// - Any efficiency value is outside the range [0.0, 1.0]
    pub fn from_table(
        wavelengths_nm: Vec<f64>,
        efficiencies: Vec<f64>,
    ) -> Result<Self, QuantumEfficiencyError> {
        if wavelengths_nm.len() != efficiencies.len() {
            return Err(QuantumEfficiencyError::LengthMismatch);
        }
        if wavelengths_nm.len() < 2 {
            return Err(QuantumEfficiencyError::TooFewSamples);
        }
        if wavelengths_nm.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(QuantumEfficiencyError::NotAscending);
        }
        if efficiencies.iter().any(|e| !(0.0..=1.0).contains(e)) {
            return Err(QuantumEfficiencyError::OutOfRange);
        }

        Ok(Self::Tabulated {
            wavelengths_nm,
            efficiencies,
        })
    }

    /// Quantum efficiency at `wavelength`, clamped to zero below [`QE_FLOOR`].
    pub fn at(&self, wavelength: Wavelength) -> f64 {
        let raw = match self {
            Self::Polynomial(model) => model.evaluate_um(wavelength.as_micrometers()),
            Self::Tabulated {
                wavelengths_nm,
                efficiencies,
            } => {
                let nm = wavelength.as_nanometers();
                let last = wavelengths_nm.len() - 1;
                if !(nm >= wavelengths_nm[0] && nm <= wavelengths_nm[last]) {
                    0.0
                } else {
                    shared::algo::interp(nm, wavelengths_nm, efficiencies).unwrap_or(0.0)
                }
            }
        };

        if raw.is_finite() && raw >= QE_FLOOR {
            raw
        } else {
            0.0
        }
    }
}
