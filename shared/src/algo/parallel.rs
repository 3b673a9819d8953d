//! Parallel processing utilities with deterministic seeding.
//!
//! Work is partitioned so that each output frame is owned by exactly one
//! worker, and each worker draws from its own RNG whose seed depends only on
//! the base seed, a stream tag and the frame index. Results are therefore
//! identical regardless of how many threads rayon schedules.

use ndarray::{Array3, ArrayViewMut2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Derive an independent seed for `(stream, index)` from a base seed.
///
/// Uses the SplitMix64 finaliser so that neighbouring indices and streams map
/// to well-separated seeds.
pub fn derive_seed(base: u64, stream: u64, index: u64) -> u64 {
    let mut z = base
        .wrapping_add(stream.wrapping_mul(0xD1B5_4A32_D192_ED03))
        .wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Process each frame (axis 0) of a stack in parallel with its own seeded RNG.
///
/// The processor receives the frame index, a mutable view of the frame and an
/// RNG seeded from `derive_seed(seed, stream, frame_index)`. The first error
/// returned by any frame is propagated.
///
/// # Arguments
/// * `stack` - Frame stack shaped `(frames, rows, cols)`
/// * `seed` - Base seed for the run
/// * `stream` - Tag separating independent uses of the same base seed
/// * `processor` - Closure applied to every frame
pub fn process_frames_in_parallel<F, E>(
    stack: &mut Array3<f64>,
    seed: u64,
    stream: u64,
    processor: F,
) -> Result<(), E>
where
    F: Fn(usize, ArrayViewMut2<f64>, &mut StdRng) -> Result<(), E> + Send + Sync,
    E: Send,
{
    stack
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(frame_idx, frame)| {
            let mut rng = StdRng::seed_from_u64(derive_seed(seed, stream, frame_idx as u64));
            processor(frame_idx, frame, &mut rng)
        })
}
