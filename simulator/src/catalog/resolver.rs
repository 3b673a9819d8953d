//! Resolve a raw catalog into pixel positions and electron rates.
//!
//! For every finite row the resolver projects the sky position into both
//! detector frames and converts the magnitude into a VISDA flux density and
//! electron rate. Sources are not clipped to the detector here; jitter can
//! carry them in and out of frame, so clipping happens per sub-read during
//! synthesis.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::query::{CatalogError, RawSource, SkyCatalogQuery};
use crate::catalog::wcs::WorldToPixel;
use crate::hardware::Detector;
use crate::units::{Angle, AngleExt, LengthExt, Wavelength};

/// Knobs for a catalog resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverParams {
    /// Cone search radius
    pub radius: Angle,
    /// Inclusive (bright, faint) magnitude limits
    pub magnitude_range: (f64, f64),
    /// Band over which sensitivity is integrated to get electron rates
    pub count_band: (Wavelength, Wavelength),
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            radius: Angle::from_degrees(0.155),
            magnitude_range: (-3.0, 16.0),
            count_band: (
                Wavelength::from_nanometers(100.0),
                Wavelength::from_nanometers(1000.0),
            ),
        }
    }
}

/// One resolved source. Pixel coordinates are 0-indexed and may be NaN for
/// sources behind the tangent plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub ra: f64,
    pub dec: f64,
    pub mag: f64,
    pub vis_x: f64,
    pub vis_y: f64,
    pub nir_x: f64,
    pub nir_y: f64,
    /// Expected VISDA electron rate, e⁻/s
    pub vis_counts: f64,
    /// VISDA flux density, erg s⁻¹ cm⁻² Å⁻¹
    pub vis_flux: f64,
}

/// Resolved sources around a pointing target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCatalog {
    /// Target right ascension in degrees
    pub target_ra: f64,
    /// Target declination in degrees
    pub target_dec: f64,
    pub rows: Vec<SourceRow>,
}

impl SourceCatalog {
    pub fn new(target_ra: f64, target_dec: f64, rows: Vec<SourceRow>) -> Self {
        Self {
            target_ra,
            target_dec,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the source catalog around `(target_ra, target_dec)`.
///
/// # Arguments
/// * `query` - Catalog service to search
/// * `params` - Search cone, magnitude window and counting band
/// * `vis` - Visible detector; supplies the flux scale and its WCS
/// * `nir` - Near-infrared detector; supplies its WCS
///
/// # Errors
/// Invalid search parameters, a failing query, or a VISDA zeropoint that
/// cannot be computed.
pub fn resolve_sky_catalog(
    query: &dyn SkyCatalogQuery,
    target_ra: f64,
    target_dec: f64,
    params: &ResolverParams,
    vis: &Detector,
    nir: &Detector,
) -> Result<SourceCatalog, CatalogError> {
    let (bright, faint) = params.magnitude_range;
    if !(bright.is_finite() && faint.is_finite() && bright <= faint) {
        return Err(CatalogError::InvalidMagnitudeRange(bright, faint));
    }
    let radius_deg = params.radius.as_degrees();
    if !(radius_deg.is_finite() && radius_deg > 0.0) {
        return Err(CatalogError::InvalidRadius);
    }

    let raw = query.query(target_ra, target_dec, params.radius, params.magnitude_range)?;
    let finite: Vec<RawSource> = raw.iter().filter(|row| row.is_finite()).copied().collect();
    debug!(
        "Catalog query returned {} rows, dropped {} non-finite, keeping {}",
        raw.len(),
        raw.len() - finite.len(),
        finite.len()
    );

    let coords: Vec<(f64, f64)> = finite.iter().map(|row| (row.ra, row.dec)).collect();
    let vis_pix = vis.wcs(target_ra, target_dec).all_world_to_pixel(&coords);
    let nir_pix = nir.wcs(target_ra, target_dec).all_world_to_pixel(&coords);

    let band = vis.integrated_sensitivity(params.count_band.0, params.count_band.1);
    debug!(
        "{} integrated sensitivity {:.4e} cm2 A/erg over {:.0}-{:.0} nm",
        vis.name(),
        band,
        params.count_band.0.as_nanometers(),
        params.count_band.1.as_nanometers()
    );

    let rows = finite
        .iter()
        .zip(vis_pix.iter().zip(nir_pix.iter()))
        .map(|(row, (&(vis_x, vis_y), &(nir_x, nir_y)))| {
            let vis_flux = vis.flux_from_magnitude(row.mag)?;
            Ok(SourceRow {
                ra: row.ra,
                dec: row.dec,
                mag: row.mag,
                vis_x,
                vis_y,
                nir_x,
                nir_y,
                vis_counts: vis_flux * band,
                vis_flux,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    Ok(SourceCatalog::new(target_ra, target_dec, rows))
}
