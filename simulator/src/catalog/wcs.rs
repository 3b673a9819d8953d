//! Gnomonic (TAN) world-to-pixel projection.
//!
//! Pixel coordinates are 0-indexed with the reference pixel at
//! `(cols / 2, rows / 2)`, which is also the pixel the synthesis engine treats
//! as the frame centre. The sky is shown with north up and east to the left
//! for a zero position angle, matching the usual FITS-WCS parity.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::units::{Angle, AngleExt};

/// Forward projection from sky coordinates to detector pixels.
pub trait WorldToPixel {
    /// Project `(ra, dec)` in degrees to 0-indexed `(x, y)` pixels.
    ///
    /// Points on or behind the tangent plane return `(NaN, NaN)`.
    fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> (f64, f64);

    /// Project many positions at once.
    fn all_world_to_pixel(&self, coords: &[(f64, f64)]) -> Vec<(f64, f64)> {
        coords
            .iter()
            .map(|&(ra, dec)| self.world_to_pixel(ra, dec))
            .collect()
    }
}

/// TAN projection centred on a target with a fixed pixel scale and roll.
#[derive(Debug, Clone)]
pub struct TanWcs {
    crval: (f64, f64),
    crpix: (f64, f64),
    /// Columns are the local east, north and boresight unit vectors
    basis: Matrix3<f64>,
    /// Maps tangent-plane radians to pixel offsets from `crpix`
    cd_inverse: Matrix2<f64>,
}

impl TanWcs {
    /// Build a projection.
    ///
    /// # Arguments
    /// * `ra_deg`, `dec_deg` - Tangent point, mapped onto `crpix`
    /// * `crpix` - Reference pixel `(x, y)`, 0-indexed
    /// * `pixel_scale` - Angular size of one pixel
    /// * `position_angle` - Rotation of the detector +y axis from north through east
    pub fn new(
        ra_deg: f64,
        dec_deg: f64,
        crpix: (f64, f64),
        pixel_scale: Angle,
        position_angle: Angle,
    ) -> Self {
        let (sin_ra, cos_ra) = ra_deg.to_radians().sin_cos();
        let (sin_dec, cos_dec) = dec_deg.to_radians().sin_cos();

        let boresight = Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec);
        // Local east and north; well defined away from the celestial poles
        let east = Vector3::new(-sin_ra, cos_ra, 0.0);
        let north = boresight.cross(&east);

        let scale = pixel_scale.as_radians();
        let (sin_pa, cos_pa) = position_angle.as_radians().sin_cos();
        // CD maps (dx, dy) to (ξ, η); east runs toward -x at zero roll
        let cd = Matrix2::new(-cos_pa, sin_pa, sin_pa, cos_pa) * scale;
        let cd_inverse = cd.try_inverse().unwrap_or_else(|| Matrix2::from_element(f64::NAN));

        Self {
            crval: (ra_deg, dec_deg),
            crpix,
            basis: Matrix3::from_columns(&[east, north, boresight]),
            cd_inverse,
        }
    }

    /// Tangent point `(ra, dec)` in degrees
    pub fn crval(&self) -> (f64, f64) {
        self.crval
    }

    /// Reference pixel `(x, y)`
    pub fn crpix(&self) -> (f64, f64) {
        self.crpix
    }

    /// Standard coordinates `(ξ, η)` in radians, `None` behind the tangent plane.
    pub fn tangent_plane(&self, ra_deg: f64, dec_deg: f64) -> Option<(f64, f64)> {
        let (sin_ra, cos_ra) = ra_deg.to_radians().sin_cos();
        let (sin_dec, cos_dec) = dec_deg.to_radians().sin_cos();
        let v = Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec);

        let local = self.basis.transpose() * v;
        if !(local.z > 1e-12) {
            return None;
        }
        Some((local.x / local.z, local.y / local.z))
    }
}

impl WorldToPixel for TanWcs {
    fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> (f64, f64) {
        match self.tangent_plane(ra_deg, dec_deg) {
            Some((xi, eta)) => {
                let offset = self.cd_inverse * Vector2::new(xi, eta);
                (self.crpix.0 + offset.x, self.crpix.1 + offset.y)
            }
            None => (f64::NAN, f64::NAN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wcs() -> TanWcs {
        TanWcs::new(
            120.0,
            30.0,
            (1024.0, 1024.0),
            Angle::from_arcseconds(0.78),
            Angle::from_degrees(0.0),
        )
    }

    #[test]
    fn test_tangent_point_maps_to_crpix() {
        let (x, y) = wcs().world_to_pixel(120.0, 30.0);
        assert_relative_eq!(x, 1024.0, epsilon = 1e-9);
        assert_relative_eq!(y, 1024.0, epsilon = 1e-9);
    }

    #[test]
    fn test_north_up_east_left() {
        let w = wcs();
        // 78 arcsec north is 100 pixels up
        let (x, y) = w.world_to_pixel(120.0, 30.0 + 78.0 / 3600.0);
        assert_relative_eq!(x, 1024.0, epsilon = 1e-6);
        assert_relative_eq!(y, 1124.0, epsilon = 1e-3);

        // East (increasing RA) moves to smaller x
        let (x_east, _) = w.world_to_pixel(120.01, 30.0);
        assert!(x_east < 1024.0);
    }

    #[test]
    fn test_position_angle_rotates() {
        let rotated = TanWcs::new(
            120.0,
            30.0,
            (0.0, 0.0),
            Angle::from_arcseconds(1.0),
            Angle::from_degrees(90.0),
        );
        // With +y pointing east, a northward offset lands on the x axis
        let (x, y) = rotated.world_to_pixel(120.0, 30.0 + 10.0 / 3600.0);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(x.abs(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_far_side_is_nan() {
        let (x, y) = wcs().world_to_pixel(300.0, -30.0);
        assert!(x.is_nan() && y.is_nan());
    }

    #[test]
    fn test_batch_matches_single() {
        let w = wcs();
        let coords = [(120.0, 30.0), (120.05, 30.02)];
        let batch = w.all_world_to_pixel(&coords);
        assert_eq!(batch[1], w.world_to_pixel(120.05, 30.02));
    }
}
