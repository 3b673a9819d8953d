//! Pandora detector response and synthetic sky image simulation
//!
//! This crate models the two Pandora detector channels (sensitivity,
//! zeropoint, noise properties), resolves sky catalogs into detector pixel
//! coordinates and electron rates, and synthesizes jittered, noisy frame
//! stacks from them.

pub mod algo;
pub mod catalog;
pub mod config;
pub mod hardware;
pub mod image_proc;
pub mod io;
pub mod observatory;
pub mod photometry;
pub mod sims;
pub mod units;

// Re-exports for easier access
pub use catalog::{resolve_sky_catalog, SkyCatalogQuery, SourceCatalog, SourceRow, StaticCatalog};
pub use config::{ConfigError, SimulationConfig};
pub use hardware::{Detector, DetectorError, DetectorKind, Optics};
pub use image_proc::prf::{GaussianPrf, PixelResponse};
pub use io::{AssetProvider, BuiltinAssets};
pub use observatory::Observatory;
pub use sims::{synthesize_sky_images, CancelToken, SkyImages, SynthesisError, SynthesisParams};
