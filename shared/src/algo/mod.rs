//! Algorithms for interpolation, integration and parallel processing.

pub mod integrate;
pub mod misc;
pub mod parallel;

pub use integrate::{trap_integrate, trap_integrate_fn};
pub use misc::{interp, interp_clamped, InterpError};
pub use parallel::{derive_seed, process_frames_in_parallel};
