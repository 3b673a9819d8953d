//! Synthetic VISDA frame stacks from a resolved source catalog.
//!
//! A run of `nt` integrated frames, each summing `nreads` sub-reads, proceeds
//! in three stages:
//!
//! 1. One jitter trace of `nt × nreads` samples is drawn for the whole run at
//!    the single-read cadence.
//! 2. Frames are filled in parallel. Each sub-read places every source at its
//!    jittered position, evaluates the pixel response there and adds a
//!    Poisson draw of `weight × rate × read_time` electrons per pixel.
//! 3. With noise enabled, background light is added over the total exposure,
//!    pixels outside the field stop are zeroed, and each frame receives read
//!    noise about the bias plus dark current on the illuminated pixels.
//!
//! Every random stream is seeded from the run seed, a stream tag and the
//! frame index, so a given seed reproduces the same stack on any number of
//! threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use ndarray::{Array3, ArrayViewMut2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::algo::{derive_seed, process_frames_in_parallel};
use shared::image_proc::noise::{add_masked_read_and_dark_noise, sample_poisson, NoiseError};
use thiserror::Error;

use crate::algo::{generate_jitter, JitterError, JitterParams, JitterTrace};
use crate::catalog::{SourceCatalog, SourceRow};
use crate::hardware::{Detector, DetectorError};
use crate::image_proc::prf::{PixelResponse, PrfError};
use crate::sims::background::BackgroundEstimator;
use crate::units::{LengthExt, Temperature, TemperatureExt, Wavelength};

const JITTER_STREAM: u64 = 1;
const PHOTON_STREAM: u64 = 2;
const NOISE_STREAM: u64 = 3;

/// Errors raised while synthesizing frames
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Jitter(#[from] JitterError),

    #[error(transparent)]
    Noise(#[from] NoiseError),

    #[error(transparent)]
    Prf(#[from] PrfError),

    #[error("Synthesis was cancelled")]
    Cancelled,

    #[error("Invalid synthesis parameter: {0}")]
    InvalidParameter(String),
}

/// Cooperative cancellation flag shared between a caller and a running synthesis.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parameters of one synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    /// Wavelength at which the PSF is evaluated
    pub wavelength: Wavelength,
    /// Telescope temperature for the PSF
    pub temperature: Temperature,
    /// Sub-reads summed into each integrated frame
    pub nreads: usize,
    /// Number of integrated frames
    pub nt: usize,
    pub jitter_x_3sigma_px: f64,
    pub jitter_y_3sigma_px: f64,
    pub jitter_timescale: Duration,
    /// Add background, field-stop masking, read noise and dark current
    pub include_noise: bool,
    pub seed: u64,
    /// Sources further than this from frame centre (either axis) are skipped
    pub rejection_margin_px: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            wavelength: Wavelength::from_micrometers(0.54),
            temperature: Temperature::from_celsius(10.0),
            nreads: 10,
            nt: 40,
            jitter_x_3sigma_px: 2.0,
            jitter_y_3sigma_px: 2.0,
            jitter_timescale: Duration::from_secs(1),
            include_noise: true,
            seed: 0,
            rejection_margin_px: 750.0,
        }
    }
}

impl SynthesisParams {
    fn validate(&self) -> Result<(), SynthesisError> {
        if self.nreads == 0 {
            return Err(SynthesisError::InvalidParameter(
                "nreads must be at least 1".to_string(),
            ));
        }
        if self.nt == 0 {
            return Err(SynthesisError::InvalidParameter(
                "nt must be at least 1".to_string(),
            ));
        }
        if !(self.rejection_margin_px.is_finite() && self.rejection_margin_px >= 0.0) {
            return Err(SynthesisError::InvalidParameter(format!(
                "rejection margin must be finite and non-negative, got {}",
                self.rejection_margin_px
            )));
        }
        Ok(())
    }
}

/// Output of a synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyImages {
    /// Pointing offsets, one sample per sub-read
    pub jitter: JitterTrace,
    /// Electron counts shaped `(nt, rows, cols)`
    pub frames: Array3<f64>,
}

/// Per-frame noise inputs resolved from the detector before any work starts.
#[derive(Debug, Clone, Copy)]
struct NoiseBudget {
    background_e: f64,
    bias_e: f64,
    read_noise_e: f64,
    dark_e: f64,
}

/// Add one sub-read of every source into `frame`.
///
/// `offset` is the pointing offset for this sub-read and `center` the frame
/// centre `(x, y)`; both in pixels. Returns how many sources were skipped for
/// lying outside the rejection margin.
#[allow(clippy::too_many_arguments)]
pub fn accumulate_sub_read<R: Rng + ?Sized>(
    frame: &mut ArrayViewMut2<f64>,
    sources: &[SourceRow],
    offset: (f64, f64),
    center: (f64, f64),
    prf: &dyn PixelResponse,
    margin_px: f64,
    read_time_s: f64,
    rng: &mut R,
) -> usize {
    let (rows, cols) = frame.dim();
    let mut skipped = 0;

    for source in sources {
        let dx = source.vis_x + offset.0 - center.0;
        let dy = source.vis_y + offset.1 - center.1;
        // NaN comparisons are false, so unprojectable sources land here too
        if !(dx.abs() <= margin_px && dy.abs() <= margin_px) {
            skipped += 1;
            continue;
        }

        let expected = source.vis_counts * read_time_s;
        let footprint = prf.evaluate(dx, dy);
        for (row_off, col_off, weight) in footprint.iter() {
            let r = center.1 as i64 + row_off;
            let c = center.0 as i64 + col_off;
            if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                continue;
            }
            frame[[r as usize, c as usize]] += sample_poisson(weight * expected, rng);
        }
    }

    skipped
}

/// Simulate a stack of VISDA frames for `catalog`.
///
/// # Arguments
/// * `catalog` - Resolved sources with VISDA pixel positions and rates
/// * `detector` - Detector whose shape, read time and noise are used
/// * `prf` - Pixel response evaluated at each jittered position
/// * `background` - Background light estimate for the catalog target
/// * `params` - Run shape, jitter and noise switches
/// * `cancel` - Optional flag checked between sub-reads
///
/// # Errors
/// Invalid parameters, unconfigured detector properties (integration time,
/// and with noise enabled read noise, bias and dark current), or cancellation.
pub fn synthesize_sky_images(
    catalog: &SourceCatalog,
    detector: &Detector,
    prf: &dyn PixelResponse,
    background: &dyn BackgroundEstimator,
    params: &SynthesisParams,
    cancel: Option<&CancelToken>,
) -> Result<SkyImages, SynthesisError> {
    params.validate()?;

    let read_time = detector.integration_time()?;
    let read_time_s = read_time.as_secs_f64();
    let exposure_s = read_time_s * params.nreads as f64;

    let noise = if params.include_noise {
        let rate = background.background_rate(catalog.target_ra, catalog.target_dec);
        Some(NoiseBudget {
            background_e: rate * exposure_s,
            bias_e: detector.bias()?,
            read_noise_e: detector.read_noise()? * (params.nreads as f64).sqrt(),
            dark_e: detector.dark()? * exposure_s,
        })
    } else {
        None
    };

    info!(
        "Synthesizing {} frames x {} reads of {} sources on {} at {:.3} um, {:.1} C (seed {})",
        params.nt,
        params.nreads,
        catalog.len(),
        detector.name(),
        params.wavelength.as_micrometers(),
        params.temperature.as_celsius(),
        params.seed
    );

    let mut jitter_rng = StdRng::seed_from_u64(derive_seed(params.seed, JITTER_STREAM, 0));
    let jitter = generate_jitter(
        &JitterParams {
            x_3sigma_px: params.jitter_x_3sigma_px,
            y_3sigma_px: params.jitter_y_3sigma_px,
            timescale: params.jitter_timescale,
            cadence: read_time,
            samples: params.nt * params.nreads,
        },
        &mut jitter_rng,
    )?;

    let (rows, cols) = detector.shape();
    let (cx, cy) = detector.center_pixel();
    let center = (cx as f64, cy as f64);
    let mut frames = Array3::<f64>::zeros((params.nt, rows, cols));

    process_frames_in_parallel(
        &mut frames,
        params.seed,
        PHOTON_STREAM,
        |frame_idx, mut frame, rng| {
            let mut skipped = 0;
            for read in 0..params.nreads {
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    return Err(SynthesisError::Cancelled);
                }
                let sample = frame_idx * params.nreads + read;
                skipped += accumulate_sub_read(
                    &mut frame,
                    &catalog.rows,
                    (jitter.x[sample], jitter.y[sample]),
                    center,
                    prf,
                    params.rejection_margin_px,
                    read_time_s,
                    rng,
                );
            }
            debug!(
                "Frame {frame_idx}: {skipped} source placements outside the {} px margin",
                params.rejection_margin_px
            );
            Ok(())
        },
    )?;

    if let Some(budget) = noise {
        let mask = detector.field_stop_mask();
        process_frames_in_parallel(
            &mut frames,
            params.seed,
            NOISE_STREAM,
            |_, mut frame, rng| {
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    return Err(SynthesisError::Cancelled);
                }
                frame += budget.background_e;
                frame.zip_mut_with(&mask, |pixel, &lit| {
                    if !lit {
                        *pixel = 0.0;
                    }
                });
                add_masked_read_and_dark_noise(
                    frame,
                    mask.view(),
                    budget.bias_e,
                    budget.read_noise_e,
                    budget.dark_e,
                    rng,
                )?;
                Ok(())
            },
        )?;
    }

    Ok(SkyImages { jitter, frames })
}
