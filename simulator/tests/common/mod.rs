//! Shared fixtures for the simulator integration tests

#![allow(dead_code)]

use std::sync::Arc;

use simulator::catalog::{RawSource, ResolverParams, StaticCatalog};
use simulator::hardware::Detector;
use simulator::io::{AssetProvider, BuiltinAssets};
use simulator::{resolve_sky_catalog, Observatory, SourceCatalog};

pub const TARGET_RA: f64 = 133.0;
pub const TARGET_DEC: f64 = 20.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn observatory() -> Observatory {
    Observatory::pandora(&BuiltinAssets).expect("builtin assets are complete")
}

/// VISDA with its frame cropped to `(rows, cols)` to keep tests fast
pub fn small_visda(rows: usize, cols: usize) -> Detector {
    let obs = observatory();
    let mut params = obs.visda.params().clone();
    params.shape = (rows, cols);
    let reference = Arc::new(BuiltinAssets.reference_spectrum().expect("reference spectrum"));
    Detector::new(params, reference)
}

/// Resolve `rows` around the test target against `vis` and the real NIRDA
pub fn resolve(vis: &Detector, rows: Vec<RawSource>) -> SourceCatalog {
    let obs = observatory();
    resolve_sky_catalog(
        &StaticCatalog::new(rows),
        TARGET_RA,
        TARGET_DEC,
        &ResolverParams::default(),
        vis,
        &obs.nirda,
    )
    .expect("catalog resolves")
}

/// A handful of stars scattered within a few arcminutes of the target
pub fn small_field() -> Vec<RawSource> {
    vec![
        RawSource::new(TARGET_RA, TARGET_DEC, 9.5),
        RawSource::new(TARGET_RA + 0.004, TARGET_DEC - 0.002, 11.0),
        RawSource::new(TARGET_RA - 0.006, TARGET_DEC + 0.005, 12.3),
        RawSource::new(TARGET_RA + 0.001, TARGET_DEC + 0.008, 14.0),
        // Off a small frame but well inside the search cone
        RawSource::new(TARGET_RA + 0.1, TARGET_DEC, 10.0),
    ]
}
