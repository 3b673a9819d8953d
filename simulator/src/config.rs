//! Run configuration loaded from JSON.
//!
//! Physical quantities are written as unit-tagged strings so the file is
//! self-describing, e.g.
//!
//! ```json
//! {
//!   "wavelength": "0.54 um",
//!   "temperature": "10 degC",
//!   "nreads": 10,
//!   "nt": 40,
//!   "jitter_x": "2 pix",
//!   "jitter_y": "2 pix",
//!   "jitter_timescale": "1 s",
//!   "include_noise": true,
//!   "seed": 7,
//!   "rejection_margin_px": 750,
//!   "catalog_radius": "0.155 deg",
//!   "magnitude_range": [-3, 16]
//! }
//! ```
//!
//! Every field is optional and falls back to the defaults shown.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ResolverParams;
use crate::sims::SynthesisParams;
use crate::units::{
    parse_angle, parse_duration, parse_pixels, parse_temperature, parse_wavelength, LengthExt,
    UnitError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serializable description of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub wavelength: String,
    pub temperature: String,
    pub nreads: usize,
    pub nt: usize,
    pub jitter_x: String,
    pub jitter_y: String,
    pub jitter_timescale: String,
    pub include_noise: bool,
    /// Fixed seed; a random one is drawn and logged when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub rejection_margin_px: f64,
    pub catalog_radius: String,
    pub magnitude_range: (f64, f64),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            wavelength: "0.54 um".to_string(),
            temperature: "10 degC".to_string(),
            nreads: 10,
            nt: 40,
            jitter_x: "2 pix".to_string(),
            jitter_y: "2 pix".to_string(),
            jitter_timescale: "1 s".to_string(),
            include_noise: true,
            seed: None,
            rejection_margin_px: 750.0,
            catalog_radius: "0.155 deg".to_string(),
            magnitude_range: (-3.0, 16.0),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and convert into typed synthesis and resolver parameters.
    pub fn to_params(&self) -> Result<(SynthesisParams, ResolverParams), ConfigError> {
        if self.nreads == 0 || self.nt == 0 {
            return Err(ConfigError::Invalid(format!(
                "nreads and nt must be at least 1, got {} and {}",
                self.nreads, self.nt
            )));
        }
        if !(self.rejection_margin_px.is_finite() && self.rejection_margin_px >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rejection_margin_px must be finite and non-negative, got {}",
                self.rejection_margin_px
            )));
        }
        let (bright, faint) = self.magnitude_range;
        if !(bright.is_finite() && faint.is_finite() && bright <= faint) {
            return Err(ConfigError::Invalid(format!(
                "magnitude_range must be ordered [bright, faint], got [{bright}, {faint}]"
            )));
        }

        let jitter_x = parse_pixels(&self.jitter_x)?;
        let jitter_y = parse_pixels(&self.jitter_y)?;
        if jitter_x < 0.0 || jitter_y < 0.0 {
            return Err(ConfigError::Invalid(
                "jitter amplitudes must be non-negative".to_string(),
            ));
        }
        let wavelength = parse_wavelength(&self.wavelength)?;
        if !(wavelength.as_nanometers() > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "wavelength must be positive, got '{}'",
                self.wavelength
            )));
        }

        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!("No seed configured, using {seed}");
                seed
            }
        };

        let synthesis = SynthesisParams {
            wavelength,
            temperature: parse_temperature(&self.temperature)?,
            nreads: self.nreads,
            nt: self.nt,
            jitter_x_3sigma_px: jitter_x,
            jitter_y_3sigma_px: jitter_y,
            jitter_timescale: parse_duration(&self.jitter_timescale)?,
            include_noise: self.include_noise,
            seed,
            rejection_margin_px: self.rejection_margin_px,
        };
        let resolver = ResolverParams {
            radius: parse_angle(&self.catalog_radius)?,
            magnitude_range: self.magnitude_range,
            ..ResolverParams::default()
        };
        Ok((synthesis, resolver))
    }
}
