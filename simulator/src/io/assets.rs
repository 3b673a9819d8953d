//! Static lookup tables consumed by the instrument model.
//!
//! Curves are delivered through the [`AssetProvider`] trait so callers can
//! back them with files, a database or the compiled-in [`BuiltinAssets`].
//! Every table is loaded once when the observatory is built and treated as
//! read-only afterwards.

use thiserror::Error;

use crate::hardware::DetectorKind;
use crate::photometry::ReferenceSpectrum;

/// Errors raised while fetching or validating a lookup table
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("Asset '{0}' is not available")]
    Missing(String),

    #[error("Asset '{name}' is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

/// A `(wavelength_nm, value)` table
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTable {
    pub wavelengths_nm: Vec<f64>,
    pub values: Vec<f64>,
}

impl CurveTable {
    pub fn new(wavelengths_nm: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            wavelengths_nm,
            values,
        }
    }
}

/// A named pointing target from the mission target list
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
}

/// Source of the tabulated data the instrument model depends on.
pub trait AssetProvider {
    /// Dichroic transmission in percent along the light path of `detector`
    fn throughput_table(&self, detector: DetectorKind) -> Result<CurveTable, AssetError>;

    /// Optional measured QE curve overriding the analytic model for `detector`
    fn qe_table(&self, detector: DetectorKind) -> Result<Option<CurveTable>, AssetError>;

    /// Reference spectrum used to compute magnitude zeropoints
    fn reference_spectrum(&self) -> Result<ReferenceSpectrum, AssetError>;

    /// Mission target list
    fn targets(&self) -> Result<Vec<Target>, AssetError>;
}

/// Representative instrument curves compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAssets;

impl AssetProvider for BuiltinAssets {
    fn throughput_table(&self, detector: DetectorKind) -> Result<CurveTable, AssetError> {
        let table = match detector {
            // Transmitted through the dichroic
            DetectorKind::NearInfrared => CurveTable::new(
                vec![
                    300.0, 800.0, 900.0, 950.0, 1000.0, 1100.0, 1500.0, 2000.0, 2500.0, 3000.0,
                ],
                vec![0.0, 2.0, 10.0, 60.0, 92.0, 95.0, 96.0, 95.0, 90.0, 85.0],
            ),
            // Reflected off the dichroic
            DetectorKind::Visible => CurveTable::new(
                vec![
                    300.0, 350.0, 400.0, 500.0, 700.0, 850.0, 900.0, 950.0, 1000.0, 1100.0, 3000.0,
                ],
                vec![20.0, 70.0, 92.0, 95.0, 96.0, 95.0, 85.0, 40.0, 8.0, 2.0, 0.0],
            ),
        };
        Ok(table)
    }

    fn qe_table(&self, detector: DetectorKind) -> Result<Option<CurveTable>, AssetError> {
        match detector {
            DetectorKind::NearInfrared => Ok(None),
            DetectorKind::Visible => Ok(Some(CurveTable::new(
                (0..17).map(|i| 300.0 + 50.0 * i as f64).collect(),
                vec![
                    0.0, 0.25, 0.55, 0.72, 0.80, 0.82, 0.80, 0.75, 0.68, 0.58, 0.48, 0.38, 0.27,
                    0.17, 0.09, 0.03, 0.0,
                ],
            ))),
        }
    }

    fn reference_spectrum(&self) -> Result<ReferenceSpectrum, AssetError> {
        Ok(ReferenceSpectrum::vega_like())
    }

    fn targets(&self) -> Result<Vec<Target>, AssetError> {
        let rows = [
            ("GJ 436", 175.5463, 26.7065),
            ("HAT-P-11", 297.7101, 48.0803),
            ("WASP-69", 315.0259, -5.0948),
            ("WASP-107", 188.3866, -10.1461),
        ];
        Ok(rows
            .iter()
            .map(|&(name, ra, dec)| Target {
                name: name.to_string(),
                ra,
                dec,
            })
            .collect())
    }
}
