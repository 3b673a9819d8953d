//! Spacecraft pointing jitter as a correlated random process.
//!
//! Each axis follows a discretely sampled Ornstein-Uhlenbeck process:
//!
//! ```text
//! x[i+1] = a·x[i] + σ·sqrt(1 - a²)·ε,   a = exp(-Δt/τ),   ε ~ N(0, 1)
//! ```
//!
//! started from its stationary distribution `N(0, σ²)` with `σ = A/3`, so the
//! requested 3-sigma amplitude `A` bounds ~99.7% of samples at every step and
//! the autocorrelation decays as `exp(-|t|/τ)`.

use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use thiserror::Error;

/// Errors for invalid jitter parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JitterError {
    #[error("Jitter amplitude must be finite and non-negative, got {0}")]
    InvalidAmplitude(f64),
    #[error("Jitter cadence must be positive")]
    InvalidCadence,
}

/// Parameters of a two-axis jitter realization.
#[derive(Debug, Clone, PartialEq)]
pub struct JitterParams {
    /// 3-sigma amplitude along x, pixels
    pub x_3sigma_px: f64,
    /// 3-sigma amplitude along y, pixels
    pub y_3sigma_px: f64,
    /// Correlation timescale τ; zero gives uncorrelated samples
    pub timescale: Duration,
    /// Sample spacing Δt
    pub cadence: Duration,
    /// Number of samples
    pub samples: usize,
}

/// Synchronized time and pointing-offset samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JitterTrace {
    /// Sample times in seconds, `i·Δt`
    pub time: Vec<f64>,
    /// X offsets in pixels
    pub x: Vec<f64>,
    /// Y offsets in pixels
    pub y: Vec<f64>,
}

impl JitterTrace {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// A trace with no motion, useful for static scenes
    pub fn stationary(samples: usize, cadence: Duration) -> Self {
        Self {
            time: (0..samples).map(|i| i as f64 * cadence.as_secs_f64()).collect(),
            x: vec![0.0; samples],
            y: vec![0.0; samples],
        }
    }
}

fn ou_axis<R: Rng + ?Sized>(sigma: f64, decay: f64, samples: usize, rng: &mut R) -> Vec<f64> {
    let innovation = sigma * (1.0 - decay * decay).sqrt();
    let mut out = Vec::with_capacity(samples);
    let start: f64 = StandardNormal.sample(rng);
    let mut x = sigma * start;
    for _ in 0..samples {
        out.push(x);
        let eps: f64 = StandardNormal.sample(rng);
        x = decay * x + innovation * eps;
    }
    out
}

/// Generate an independent jitter realization from `rng`.
pub fn generate_jitter<R: Rng + ?Sized>(
    params: &JitterParams,
    rng: &mut R,
) -> Result<JitterTrace, JitterError> {
    for amplitude in [params.x_3sigma_px, params.y_3sigma_px] {
        if !(amplitude.is_finite() && amplitude >= 0.0) {
            return Err(JitterError::InvalidAmplitude(amplitude));
        }
    }
    let dt = params.cadence.as_secs_f64();
    if !(dt > 0.0) {
        return Err(JitterError::InvalidCadence);
    }

    let tau = params.timescale.as_secs_f64();
    let decay = if tau > 0.0 { (-dt / tau).exp() } else { 0.0 };

    let x = ou_axis(params.x_3sigma_px / 3.0, decay, params.samples, rng);
    let y = ou_axis(params.y_3sigma_px / 3.0, decay, params.samples, rng);
    let time = (0..params.samples).map(|i| i as f64 * dt).collect();

    Ok(JitterTrace { time, x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(samples: usize) -> JitterParams {
        JitterParams {
            x_3sigma_px: 2.0,
            y_3sigma_px: 0.5,
            timescale: Duration::from_secs(1),
            cadence: Duration::from_millis(200),
            samples,
        }
    }

    #[test]
    fn test_lengths_and_times() {
        let mut rng = StdRng::seed_from_u64(4);
        let trace = generate_jitter(&params(25), &mut rng).unwrap();
        assert_eq!(trace.len(), 25);
        assert_eq!(trace.x.len(), 25);
        assert_eq!(trace.y.len(), 25);
        assert_relative_eq!(trace.time[5], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_sigma_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let trace = generate_jitter(&params(50_000), &mut rng).unwrap();

        for (samples, amplitude) in [(&trace.x, 2.0), (&trace.y, 0.5)] {
            let n = samples.len() as f64;
            let mean = samples.iter().sum::<f64>() / n;
            let std = (samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            assert_relative_eq!(3.0 * std, amplitude, max_relative = 0.1);

            let inside = samples.iter().filter(|v| v.abs() <= amplitude).count() as f64 / n;
            assert!(inside > 0.99, "fraction inside 3 sigma: {inside}");
        }
    }

    #[test]
    fn test_samples_are_correlated() {
        let mut rng = StdRng::seed_from_u64(3);
        let trace = generate_jitter(&params(20_000), &mut rng).unwrap();
        let n = trace.x.len() - 1;
        let var = trace.x.iter().map(|v| v * v).sum::<f64>() / trace.x.len() as f64;
        let lag1 = (0..n).map(|i| trace.x[i] * trace.x[i + 1]).sum::<f64>() / n as f64;
        // exp(-0.2) ≈ 0.82
        assert_relative_eq!(lag1 / var, (-0.2f64).exp(), epsilon = 0.05);
    }

    #[test]
    fn test_zero_amplitude_is_still() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut p = params(10);
        p.x_3sigma_px = 0.0;
        p.y_3sigma_px = 0.0;
        let trace = generate_jitter(&p, &mut rng).unwrap();
        assert!(trace.x.iter().chain(&trace.y).all(|v| *v == 0.0));
        assert_eq!(
            trace,
            JitterTrace::stationary(10, Duration::from_millis(200))
        );
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let a = generate_jitter(&params(100), &mut StdRng::seed_from_u64(8)).unwrap();
        let b = generate_jitter(&params(100), &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut p = params(10);
        p.x_3sigma_px = -1.0;
        assert_eq!(
            generate_jitter(&p, &mut rng),
            Err(JitterError::InvalidAmplitude(-1.0))
        );
        let mut p = params(10);
        p.cadence = Duration::ZERO;
        assert_eq!(
            generate_jitter(&p, &mut rng),
            Err(JitterError::InvalidCadence)
        );
    }
}
