//! Per-run simulation context.
//!
//! An [`Observatory`] owns the telescope optics, both detectors and the
//! catalog resolution settings. Build one per run from an asset provider and
//! pass it by reference; nothing is shared through globals.

use std::sync::Arc;

use log::debug;

use crate::catalog::{
    resolve_sky_catalog, CatalogError, ResolverParams, SkyCatalogQuery, SourceCatalog,
};
use crate::hardware::{models, Detector, Optics};
use crate::io::{AssetError, AssetProvider, Target};
use crate::sims::{
    synthesize_sky_images, BackgroundEstimator, CancelToken, SkyImages, SynthesisError,
    SynthesisParams,
};
use crate::units::AngleExt;

#[derive(Debug, Clone)]
pub struct Observatory {
    pub optics: Optics,
    pub visda: Detector,
    pub nirda: Detector,
    pub resolver: ResolverParams,
    targets: Vec<Target>,
}

impl Observatory {
    /// Assemble the Pandora instrument from `assets`.
    ///
    /// The reference spectrum is loaded once and shared by both detectors.
    pub fn pandora(assets: &dyn AssetProvider) -> Result<Self, AssetError> {
        let optics = Optics::pandora();
        let reference = Arc::new(assets.reference_spectrum()?);
        let visda = models::visda(&optics, assets, Arc::clone(&reference))?;
        let nirda = models::nirda(&optics, assets, reference)?;
        let targets = assets.targets()?;
        debug!(
            "Built observatory with {} and {} detectors, {} targets",
            visda.name(),
            nirda.name(),
            targets.len()
        );
        Ok(Self {
            optics,
            visda,
            nirda,
            resolver: ResolverParams::default(),
            targets,
        })
    }

    /// Replace the catalog resolution settings
    pub fn with_resolver(mut self, resolver: ResolverParams) -> Self {
        self.resolver = resolver;
        self
    }

    /// Look up a mission target by name, ignoring case
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Resolve the sources around `(ra, dec)` degrees for both detectors.
    pub fn sky_catalog(
        &self,
        query: &dyn SkyCatalogQuery,
        ra: f64,
        dec: f64,
    ) -> Result<SourceCatalog, CatalogError> {
        resolve_sky_catalog(query, ra, dec, &self.resolver, &self.visda, &self.nirda)
    }

    /// Simulate VISDA frames of `catalog` with the telescope's fast PRF.
    pub fn sky_images(
        &self,
        catalog: &SourceCatalog,
        background: &dyn BackgroundEstimator,
        params: &SynthesisParams,
        cancel: Option<&CancelToken>,
    ) -> Result<SkyImages, SynthesisError> {
        let prf = self.optics.fast_prf(
            params.wavelength,
            params.temperature,
            self.visda.pixel_scale(),
        )?;
        debug!(
            "PRF sigma {:.3} px at {:.3} arcsec/px",
            prf.sigma_px(),
            self.visda.pixel_scale().as_arcseconds()
        );
        synthesize_sky_images(catalog, &self.visda, &prf, background, params, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BuiltinAssets;

    #[test]
    fn test_pandora_assembly() {
        let obs = Observatory::pandora(&BuiltinAssets).unwrap();
        assert_eq!(obs.visda.shape(), (2048, 2048));
        assert_eq!(obs.nirda.shape(), (2048, 512));
        assert!(obs.target("wasp-107").is_some());
        assert!(obs.target("Not A Star").is_none());
    }
}
