//! The two Pandora detector channels.
//!
//! Both detectors share the telescope aperture and sit behind a common
//! dichroic. Each is assembled per run from the [`Optics`] and the lookup
//! tables of an [`AssetProvider`]; nothing here is a global singleton.

use std::sync::Arc;
use std::time::Duration;

use crate::hardware::detector::{
    Detector, DetectorKind, DetectorParams, FieldStop, NoiseProperties,
};
use crate::hardware::optics::Optics;
use crate::io::assets::{AssetError, AssetProvider};
use crate::photometry::{PolynomialQe, QuantumEfficiency, ReferenceSpectrum, Throughput};
use crate::units::{Angle, AngleExt, Length, LengthExt};

/// Angular radius of the VISDA field stop
pub const FIELD_STOP_RADIUS_DEG: f64 = 0.155;

fn malformed(name: &str, err: impl std::fmt::Display) -> AssetError {
    AssetError::Malformed {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

fn throughput_for(
    assets: &dyn AssetProvider,
    kind: DetectorKind,
) -> Result<Throughput, AssetError> {
    let table = assets.throughput_table(kind)?;
    Throughput::from_dichroic_table(table.wavelengths_nm, table.values)
        .map_err(|e| malformed("throughput", e))
}

/// Measured QE override when the provider has one, else `fallback`
fn qe_for(
    assets: &dyn AssetProvider,
    kind: DetectorKind,
    fallback: Option<PolynomialQe>,
) -> Result<QuantumEfficiency, AssetError> {
    match (assets.qe_table(kind)?, fallback) {
        (Some(table), _) => QuantumEfficiency::from_table(table.wavelengths_nm, table.values)
            .map_err(|e| malformed("qe", e)),
        (None, Some(model)) => {
            QuantumEfficiency::polynomial(model).map_err(|e| malformed("qe", e))
        }
        (None, None) => Err(AssetError::Missing(format!("qe table for {kind:?}"))),
    }
}

/// Near-infrared detector assembly (NIRDA).
///
/// HgCdTe array read pixel by pixel. Read noise, bias, saturation,
/// non-linearity and single-read integration time are not characterised.
pub fn nirda(
    optics: &Optics,
    assets: &dyn AssetProvider,
    reference: Arc<ReferenceSpectrum>,
) -> Result<Detector, AssetError> {
    let params = DetectorParams {
        name: "NIR".to_string(),
        kind: DetectorKind::NearInfrared,
        pixel_scale: Angle::from_arcseconds(1.19),
        pixel_size: Length::from_micrometers(18.0),
        shape: (2048, 512),
        gain: 0.5,
        field_stop: FieldStop::Circular {
            radius: Angle::from_degrees(FIELD_STOP_RADIUS_DEG),
        },
        throughput: throughput_for(assets, DetectorKind::NearInfrared)?,
        qe: qe_for(
            assets,
            DetectorKind::NearInfrared,
            Some(PolynomialQe::pandora_nir()),
        )?,
        collecting_area_cm2: optics.collecting_area_cm2(),
        noise: NoiseProperties {
            dark_e_per_s: Some(1.0),
            pixel_read_time: Some(Duration::from_secs_f64(1e-5)),
            ..Default::default()
        },
    };
    Ok(Detector::new(params, reference))
}

/// Visible detector assembly (VISDA), the channel used for sky images.
pub fn visda(
    optics: &Optics,
    assets: &dyn AssetProvider,
    reference: Arc<ReferenceSpectrum>,
) -> Result<Detector, AssetError> {
    let params = DetectorParams {
        name: "Visible".to_string(),
        kind: DetectorKind::Visible,
        pixel_scale: Angle::from_arcseconds(0.78),
        pixel_size: Length::from_micrometers(6.5),
        shape: (2048, 2048),
        gain: 0.5,
        field_stop: FieldStop::Circular {
            radius: Angle::from_degrees(FIELD_STOP_RADIUS_DEG),
        },
        throughput: throughput_for(assets, DetectorKind::Visible)?,
        qe: qe_for(assets, DetectorKind::Visible, None)?,
        collecting_area_cm2: optics.collecting_area_cm2(),
        noise: NoiseProperties {
            read_noise_e: Some(2.1),
            bias_e: Some(100.0),
            dark_e_per_s: Some(1.0),
            integration_time: Some(Duration::from_millis(200)),
            ..Default::default()
        },
    };
    Ok(Detector::new(params, reference))
}
