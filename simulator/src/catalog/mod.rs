//! Sky catalog search, projection and photometric resolution

pub mod query;
pub mod resolver;
pub mod wcs;

pub use query::{angular_separation_deg, CatalogError, RawSource, SkyCatalogQuery, StaticCatalog};
pub use resolver::{resolve_sky_catalog, ResolverParams, SourceCatalog, SourceRow};
pub use wcs::{TanWcs, WorldToPixel};
