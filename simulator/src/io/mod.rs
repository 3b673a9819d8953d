//! I/O boundaries: lookup tables the simulator reads

pub mod assets;

pub use assets::{AssetError, AssetProvider, BuiltinAssets, CurveTable, Target};
