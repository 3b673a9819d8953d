//! Image-level processing primitives.

pub mod noise;
