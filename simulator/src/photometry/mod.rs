//! Photometry models and utilities

pub mod quantum_efficiency;
pub mod spectrum;
pub mod throughput;

pub use quantum_efficiency::{PolynomialQe, QuantumEfficiency, QuantumEfficiencyError};
pub use spectrum::{photon_energy, ReferenceSpectrum, CGS};
pub use throughput::Throughput;
