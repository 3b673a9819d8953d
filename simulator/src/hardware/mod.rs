//! Hardware models: detectors and telescope optics

pub mod detector;
pub mod models;
pub mod optics;

pub use detector::{
    Detector, DetectorError, DetectorKind, DetectorParams, FieldStop, NoiseProperties,
};
pub use optics::Optics;
