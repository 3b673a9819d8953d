//! Trapezoidal integration for sampled spectra and response curves.

/// Integrate sampled `ys` over abscissae `xs` using the trapezoidal rule.
///
/// Fewer than two samples integrate to zero and the abscissae do not need
/// to be uniformly spaced.
///
/// # Panics
/// Panics if `xs` and `ys` have different lengths; that is a programming
/// error rather than a data condition.
///
/// # Examples
///
/// ```rust
/// use shared::algo::trap_integrate;
///
/// let xs = [0.0, 1.0, 2.0];
/// let ys = [0.0, 1.0, 2.0];
/// assert_eq!(trap_integrate(&xs, &ys), 2.0);
/// ```
pub fn trap_integrate(xs: &[f64], ys: &[f64]) -> f64 {
    assert_eq!(
        xs.len(),
        ys.len(),
        "trapezoid abscissae and ordinates must have the same length"
    );

    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Integrate `f` over `[start, stop]` sampled on a uniform grid of `steps` intervals.
pub fn trap_integrate_fn<F>(start: f64, stop: f64, steps: usize, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    if steps == 0 || stop <= start {
        return 0.0;
    }

    let dx = (stop - start) / steps as f64;
    let interior: f64 = (1..steps).map(|i| f(start + i as f64 * dx)).sum();
    dx * (0.5 * (f(start) + f(stop)) + interior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_is_exact() {
        let xs: Vec<f64> = (0..=10).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 1.0).collect();
        // ∫₀⁵ 3x + 1 dx = 42.5
        assert_relative_eq!(trap_integrate(&xs, &ys), 42.5, epsilon = 1e-12);
    }

    #[test]
    fn test_nonuniform_grid() {
        let xs = [0.0, 0.1, 0.5, 2.0];
        let ys = [1.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(trap_integrate(&xs, &ys), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(trap_integrate(&[], &[]), 0.0);
        assert_eq!(trap_integrate(&[1.0], &[5.0]), 0.0);
        assert_eq!(trap_integrate_fn(1.0, 0.0, 10, |x| x), 0.0);
        assert_eq!(trap_integrate_fn(0.0, 1.0, 0, |x| x), 0.0);
    }

    #[test]
    fn test_closure_converges_on_quadratic() {
        let value = trap_integrate_fn(0.0, 1.0, 10_000, |x| x * x);
        assert_relative_eq!(value, 1.0 / 3.0, epsilon = 1e-7);
    }

    #[test]
    #[should_panic]
    fn test_length_mismatch_panics() {
        trap_integrate(&[0.0, 1.0], &[0.0]);
    }
}
