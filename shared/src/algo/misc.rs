//! One-dimensional interpolation over tabulated curves.
//!
//! Instrument curves (dichroic transmission, QE override tables, reference
//! spectra) arrive as sampled tables. Two lookups are provided:
//!
//! - [`interp`]: strict, errors when the query falls outside the table.
//! - [`interp_clamped`]: holds the first/last sample beyond the table edges,
//!   which is how transmission tables are conventionally extended.

use thiserror::Error;

/// Errors raised while validating or evaluating an interpolation table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Value {0} is out of bounds for interpolation range [{1}, {2}]")]
    OutOfBounds(f64, f64, f64),
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
    #[error("Table contains a non-finite value at index {0}")]
    NonFinite(usize),
}

/// Check that `xs`/`ys` form a usable interpolation table.
///
/// Tables must have matching lengths, at least two points, finite values and
/// non-decreasing abscissae.
pub fn validate_table(xs: &[f64], ys: &[f64]) -> Result<(), InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths);
    }
    if xs.len() < 2 {
        return Err(InterpError::InsufficientData);
    }
    if let Some(idx) = xs
        .iter()
        .zip(ys.iter())
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(InterpError::NonFinite(idx));
    }
    if xs.windows(2).any(|w| w[1] < w[0]) {
        return Err(InterpError::UnsortedData);
    }
    Ok(())
}

/// Linear interpolation inside a validated table; `x` must lie within it.
fn interp_unchecked(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    // Index of the first sample strictly greater than x
    let idx = xs.partition_point(|&val| val <= x);
    if idx == 0 {
        return ys[0];
    }
    if idx == xs.len() {
        return ys[xs.len() - 1];
    }

    let (x1, x2) = (xs[idx - 1], xs[idx]);
    let (y1, y2) = (ys[idx - 1], ys[idx]);
    if x2 == x1 {
        return y2;
    }
    let t = (x - x1) / (x2 - x1);
    y1 + t * (y2 - y1)
}

/// Linear interpolation that rejects queries outside the table.
///
/// # Examples
///
/// ```rust
/// use shared::algo::misc::interp;
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 2.0, 4.0, 6.0];
/// assert_eq!(interp(1.5, &xs, &ys).unwrap(), 3.0);
/// assert!(interp(4.0, &xs, &ys).is_err());
/// ```
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate_table(xs, ys)?;
    let (lo, hi) = (xs[0], xs[xs.len() - 1]);
    if !(lo..=hi).contains(&x) {
        return Err(InterpError::OutOfBounds(x, lo, hi));
    }
    Ok(interp_unchecked(x, xs, ys))
}

/// Linear interpolation holding the edge values outside the table.
///
/// Non-finite queries propagate as NaN so callers can mask them.
///
/// # Examples
///
/// ```rust
/// use shared::algo::misc::interp_clamped;
///
/// let xs = vec![400.0, 500.0, 600.0];
/// let ys = vec![10.0, 90.0, 50.0];
/// assert_eq!(interp_clamped(450.0, &xs, &ys).unwrap(), 50.0);
/// assert_eq!(interp_clamped(100.0, &xs, &ys).unwrap(), 10.0);
/// assert_eq!(interp_clamped(900.0, &xs, &ys).unwrap(), 50.0);
/// ```
pub fn interp_clamped(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate_table(xs, ys)?;
    if x.is_nan() {
        return Ok(f64::NAN);
    }
    if x <= xs[0] {
        return Ok(ys[0]);
    }
    if x >= xs[xs.len() - 1] {
        return Ok(ys[ys.len() - 1]);
    }
    Ok(interp_unchecked(x, xs, ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interp_midpoints_and_knots() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 2.0, 4.0, 6.0];

        assert_eq!(interp(0.0, &xs, &ys).unwrap(), 0.0);
        assert_eq!(interp(3.0, &xs, &ys).unwrap(), 6.0);
        assert_relative_eq!(interp(2.25, &xs, &ys).unwrap(), 4.5);
    }

    #[test]
    fn test_interp_out_of_bounds() {
        let xs = [0.0, 1.0];
        let ys = [0.0, 1.0];
        assert_eq!(
            interp(-0.5, &xs, &ys),
            Err(InterpError::OutOfBounds(-0.5, 0.0, 1.0))
        );
    }

    #[test]
    fn test_clamped_holds_edges() {
        let xs = [400.0, 500.0, 600.0];
        let ys = [10.0, 90.0, 50.0];

        assert_eq!(interp_clamped(0.0, &xs, &ys).unwrap(), 10.0);
        assert_eq!(interp_clamped(1e6, &xs, &ys).unwrap(), 50.0);
        assert_relative_eq!(interp_clamped(550.0, &xs, &ys).unwrap(), 70.0);
        assert!(interp_clamped(f64::NAN, &xs, &ys).unwrap().is_nan());
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(
            interp_clamped(1.0, &[0.0], &[1.0]),
            Err(InterpError::InsufficientData)
        );
        assert_eq!(
            interp_clamped(1.0, &[0.0, 1.0], &[1.0]),
            Err(InterpError::MismatchedLengths)
        );
        assert_eq!(
            interp_clamped(1.0, &[1.0, 0.0], &[1.0, 2.0]),
            Err(InterpError::UnsortedData)
        );
        assert_eq!(
            interp_clamped(1.0, &[0.0, 1.0], &[1.0, f64::INFINITY]),
            Err(InterpError::NonFinite(1))
        );
    }

    #[test]
    fn test_repeated_knot_does_not_divide_by_zero() {
        let xs = [0.0, 1.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 3.0, 3.0];
        let value = interp_clamped(1.0, &xs, &ys).unwrap();
        assert!(value.is_finite());
    }
}
