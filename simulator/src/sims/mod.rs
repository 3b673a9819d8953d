//! Sky image synthesis and its background-light collaborators

pub mod background;
pub mod synthesis;

pub use background::{
    ecliptic_latitude_deg, BackgroundEstimator, ConstantBackground, ZodiacalBackground,
};
pub use synthesis::{
    accumulate_sub_read, synthesize_sky_images, CancelToken, SkyImages, SynthesisError,
    SynthesisParams,
};
