//! Stochastic processes used by the simulator

pub mod jitter;

pub use jitter::{generate_jitter, JitterError, JitterParams, JitterTrace};
