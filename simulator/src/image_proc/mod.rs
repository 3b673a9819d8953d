//! Image formation specific to the simulator.
//!
//! Instrument-independent primitives (noise generation) live in the shared
//! crate and are re-exported here.

pub mod prf;

pub use prf::{GaussianPrf, PixelResponse, PrfError, PrfFootprint};
pub use shared::image_proc::noise;
