//! Sky catalog queries.
//!
//! The resolver only depends on the [`SkyCatalogQuery`] contract: given a
//! cone and a magnitude window, return raw `(ra, dec, mag)` rows. Rows may
//! contain non-finite values; filtering those is the resolver's job.

use thiserror::Error;

use crate::hardware::DetectorError;
use crate::units::{Angle, AngleExt};

/// Errors raised while fetching or resolving a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog query failed: {0}")]
    Query(String),

    #[error("Invalid magnitude range [{0}, {1}]")]
    InvalidMagnitudeRange(f64, f64),

    #[error("Search radius must be finite and positive")]
    InvalidRadius,

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// One raw catalog row; values are as delivered by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSource {
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    /// Apparent magnitude
    pub mag: f64,
}

impl RawSource {
    pub fn new(ra: f64, dec: f64, mag: f64) -> Self {
        Self { ra, dec, mag }
    }

    /// True when position and magnitude are all finite
    pub fn is_finite(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite() && self.mag.is_finite()
    }
}

/// Cone search against a sky catalog.
pub trait SkyCatalogQuery {
    /// Rows within `radius` of `(ra, dec)` degrees with magnitude in `magnitude_range`.
    fn query(
        &self,
        ra: f64,
        dec: f64,
        radius: Angle,
        magnitude_range: (f64, f64),
    ) -> Result<Vec<RawSource>, CatalogError>;
}

/// Great-circle separation between two positions in degrees, haversine form.
pub fn angular_separation_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (ra1, dec1, ra2, dec2) = (
        ra1.to_radians(),
        dec1.to_radians(),
        ra2.to_radians(),
        dec2.to_radians(),
    );
    let a = ((dec2 - dec1) / 2.0).sin().powi(2)
        + dec1.cos() * dec2.cos() * ((ra2 - ra1) / 2.0).sin().powi(2);
    (2.0 * a.sqrt().min(1.0).asin()).to_degrees()
}

/// In-memory catalog answering cone searches by brute force.
///
/// Rows with non-finite values are always returned, matching the behaviour
/// of upstream services that emit placeholder rows.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    rows: Vec<RawSource>,
}

impl StaticCatalog {
    pub fn new(rows: Vec<RawSource>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RawSource] {
        &self.rows
    }
}

impl SkyCatalogQuery for StaticCatalog {
    fn query(
        &self,
        ra: f64,
        dec: f64,
        radius: Angle,
        magnitude_range: (f64, f64),
    ) -> Result<Vec<RawSource>, CatalogError> {
        let radius_deg = radius.as_degrees();
        let (lo, hi) = magnitude_range;
        Ok(self
            .rows
            .iter()
            .filter(|row| {
                !row.is_finite()
                    || (angular_separation_deg(ra, dec, row.ra, row.dec) <= radius_deg
                        && row.mag >= lo
                        && row.mag <= hi)
            })
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angular_separation() {
        assert_relative_eq!(angular_separation_deg(10.0, 0.0, 11.0, 0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(angular_separation_deg(0.0, 89.0, 180.0, 89.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(angular_separation_deg(359.9, 0.0, 0.1, 0.0), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_static_catalog_cone_and_magnitude() {
        let catalog = StaticCatalog::new(vec![
            RawSource::new(100.0, 20.0, 8.0),
            RawSource::new(100.1, 20.0, 12.0),
            RawSource::new(101.0, 20.0, 9.0),
            RawSource::new(100.0, 20.05, 17.0),
            RawSource::new(f64::NAN, 20.0, 9.0),
        ]);

        let rows = catalog
            .query(100.0, 20.0, Angle::from_degrees(0.155), (-3.0, 16.0))
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].mag, 8.0);
        assert_eq!(rows[1].mag, 12.0);
        assert!(rows[2].ra.is_nan());
    }
}
