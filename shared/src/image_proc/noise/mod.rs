//! Noise generation for detector simulation.

pub mod generate;

pub use generate::{add_masked_read_and_dark_noise, sample_poisson, NoiseError};
