//! Detector model: geometry, spectral response and noise properties.
//!
//! A [`Detector`] is immutable once built. Derived quantities are computed
//! from the stored curves on demand, except the magnitude zeropoint which is
//! an integral over the full reference spectrum and is memoized per instance.
//!
//! # Units
//!
//! - Sensitivity is returned in cm² erg⁻¹: detected photons per second per Å
//!   for a unit flux density of 1 erg s⁻¹ cm⁻² Å⁻¹.
//! - Integrated sensitivity is in cm² Å erg⁻¹, so multiplying by a flux
//!   density yields an electron rate.
//! - Zeropoint and fluxes are flux densities in erg s⁻¹ cm⁻² Å⁻¹.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use ndarray::{Array, Array2, ArrayBase, Data, Dimension};
use once_cell::sync::OnceCell;
use shared::algo::{trap_integrate, trap_integrate_fn};
use thiserror::Error;

use crate::catalog::wcs::TanWcs;
use crate::photometry::{photon_energy, QuantumEfficiency, ReferenceSpectrum, Throughput};
use crate::units::{Angle, AngleExt, Length, LengthExt, Wavelength};

/// Errors raised by detector property access and derived calculations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorError {
    #[error("{property} is not configured for detector {detector}")]
    NotConfigured {
        detector: String,
        property: &'static str,
    },

    #[error("Sensitivity of detector {0} integrates to zero over the reference spectrum")]
    DegenerateSensitivity(String),
}

/// Which channel of the instrument a detector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    NearInfrared,
    Visible,
}

/// Geometry of the optically illuminated region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldStop {
    /// Every pixel is illuminated
    Open,
    /// Illuminated disc centred on the frame centre
    Circular { radius: Angle },
}

/// Noise and readout properties. `None` means "not characterised".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseProperties {
    /// Read noise per read, electrons
    pub read_noise_e: Option<f64>,
    /// Bias level, electrons
    pub bias_e: Option<f64>,
    /// Dark current, electrons per second per pixel
    pub dark_e_per_s: Option<f64>,
    /// Full-well saturation limit, electrons
    pub saturation_e: Option<f64>,
    /// Fractional non-linearity at full well
    pub non_linearity: Option<f64>,
    /// Single-read integration time
    pub integration_time: Option<Duration>,
    /// Time to read one pixel
    pub pixel_read_time: Option<Duration>,
}

/// Static description of a detector, consumed by [`Detector::new`].
#[derive(Debug, Clone)]
pub struct DetectorParams {
    pub name: String,
    pub kind: DetectorKind,
    /// Angular size of one pixel on the sky
    pub pixel_scale: Angle,
    /// Physical pixel pitch
    pub pixel_size: Length,
    /// (rows, columns)
    pub shape: (usize, usize),
    /// Electrons per DN
    pub gain: f64,
    pub field_stop: FieldStop,
    pub throughput: Throughput,
    pub qe: QuantumEfficiency,
    /// Telescope collecting area in cm²
    pub collecting_area_cm2: f64,
    pub noise: NoiseProperties,
}

/// An immutable detector with memoized zeropoint.
#[derive(Debug)]
pub struct Detector {
    params: DetectorParams,
    reference: Arc<ReferenceSpectrum>,
    zeropoint: OnceCell<f64>,
}

impl Clone for Detector {
    fn clone(&self) -> Self {
        // The cache stays valid because the clone has identical parameters
        Self {
            params: self.params.clone(),
            reference: Arc::clone(&self.reference),
            zeropoint: self
                .zeropoint
                .get()
                .copied()
                .map(OnceCell::with_value)
                .unwrap_or_default(),
        }
    }
}

impl Detector {
    /// Create a detector from its parameters and the zeropoint reference spectrum.
    pub fn new(params: DetectorParams, reference: Arc<ReferenceSpectrum>) -> Self {
        Self {
            params,
            reference,
            zeropoint: OnceCell::new(),
        }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn kind(&self) -> DetectorKind {
        self.params.kind
    }

    pub fn pixel_scale(&self) -> Angle {
        self.params.pixel_scale
    }

    pub fn pixel_size(&self) -> Length {
        self.params.pixel_size
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.params.shape
    }

    /// Number of columns; WCS axes are column-major
    pub fn naxis1(&self) -> usize {
        self.params.shape.1
    }

    /// Number of rows
    pub fn naxis2(&self) -> usize {
        self.params.shape.0
    }

    pub fn has_field_stop(&self) -> bool {
        !matches!(self.params.field_stop, FieldStop::Open)
    }

    /// Electrons per DN
    pub fn gain(&self) -> f64 {
        self.params.gain
    }

    fn not_configured(&self, property: &'static str) -> DetectorError {
        DetectorError::NotConfigured {
            detector: self.params.name.clone(),
            property,
        }
    }

    pub fn read_noise(&self) -> Result<f64, DetectorError> {
        self.params
            .noise
            .read_noise_e
            .ok_or_else(|| self.not_configured("read noise"))
    }

    pub fn bias(&self) -> Result<f64, DetectorError> {
        self.params
            .noise
            .bias_e
            .ok_or_else(|| self.not_configured("bias"))
    }

    pub fn dark(&self) -> Result<f64, DetectorError> {
        self.params
            .noise
            .dark_e_per_s
            .ok_or_else(|| self.not_configured("dark current"))
    }

    pub fn saturation_limit(&self) -> Result<f64, DetectorError> {
        self.params
            .noise
            .saturation_e
            .ok_or_else(|| self.not_configured("saturation limit"))
    }

    pub fn non_linearity(&self) -> Result<f64, DetectorError> {
        self.params
            .noise
            .non_linearity
            .ok_or_else(|| self.not_configured("non-linearity"))
    }

    pub fn integration_time(&self) -> Result<Duration, DetectorError> {
        self.params
            .noise
            .integration_time
            .ok_or_else(|| self.not_configured("integration time"))
    }

    pub fn pixel_read_time(&self) -> Result<Duration, DetectorError> {
        self.params
            .noise
            .pixel_read_time
            .ok_or_else(|| self.not_configured("pixel read time"))
    }

    /// Time to read a `(rows, cols)` subarray pixel by pixel.
    pub fn frame_time(&self, subarray: (usize, usize)) -> Result<Duration, DetectorError> {
        let per_pixel = self.pixel_read_time()?;
        let pixels = (subarray.0 * subarray.1) as f64;
        Ok(Duration::from_secs_f64(per_pixel.as_secs_f64() * pixels))
    }

    /// Fractional throughput at `wavelength`
    pub fn throughput(&self, wavelength: Wavelength) -> f64 {
        self.params.throughput.at(wavelength)
    }

    /// Quantum efficiency at `wavelength`, zero below the noise floor
    pub fn quantum_efficiency(&self, wavelength: Wavelength) -> f64 {
        self.params.qe.at(wavelength)
    }

    /// Detected photon rate per Å for a unit flat flux density, in cm² erg⁻¹.
    ///
    /// Combines collecting area, throughput and QE with the photon energy at
    /// `wavelength`. Degenerate inputs clamp to zero.
    pub fn sensitivity(&self, wavelength: Wavelength) -> f64 {
        let value = self.params.collecting_area_cm2 * self.throughput(wavelength)
            / photon_energy(wavelength)
            * self.quantum_efficiency(wavelength);
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }

    /// Sensitivity integrated over `[lower, upper]` on a 1 nm grid, in cm² Å erg⁻¹.
    pub fn integrated_sensitivity(&self, lower: Wavelength, upper: Wavelength) -> f64 {
        let lo = lower.as_angstroms();
        let hi = upper.as_angstroms();
        let steps = ((hi - lo) / 10.0).round().max(1.0) as usize;
        trap_integrate_fn(lo, hi, steps, |aa| {
            self.sensitivity(Wavelength::from_angstroms(aa))
        })
    }

    /// Sensitivity-weighted mean wavelength over 0.1–3 µm.
    pub fn midpoint(&self) -> Result<Wavelength, DetectorError> {
        let (weighted, total) = (0..580)
            .map(|i| 0.1 + 0.005 * i as f64)
            .fold((0.0, 0.0), |(weighted, total), um| {
                let weight = self.sensitivity(Wavelength::from_micrometers(um));
                (weighted + um * weight, total + weight)
            });

        if total > 0.0 {
            Ok(Wavelength::from_micrometers(weighted / total))
        } else {
            Err(DetectorError::DegenerateSensitivity(self.params.name.clone()))
        }
    }

    /// Flux density corresponding to magnitude zero, erg s⁻¹ cm⁻² Å⁻¹.
    ///
    /// The sensitivity-weighted mean of the reference spectrum. Computed on
    /// first use and cached for the lifetime of the detector.
    pub fn zeropoint(&self) -> Result<f64, DetectorError> {
        self.zeropoint
            .get_or_try_init(|| {
                let wavelengths = self.reference.wavelengths_aa();
                let sens: Vec<f64> = wavelengths
                    .iter()
                    .map(|&aa| self.sensitivity(Wavelength::from_angstroms(aa)))
                    .collect();
                let weighted: Vec<f64> = sens
                    .iter()
                    .zip(self.reference.flux_density())
                    .map(|(s, f)| s * f)
                    .collect();

                let norm = trap_integrate(wavelengths, &sens);
                if !(norm > 0.0) {
                    return Err(DetectorError::DegenerateSensitivity(
                        self.params.name.clone(),
                    ));
                }
                let zp = trap_integrate(wavelengths, &weighted) / norm;
                debug!("Zeropoint for {}: {:.4e} erg/s/cm2/A", self.params.name, zp);
                Ok(zp)
            })
            .copied()
    }

    /// Magnitude of a source with flux density `flux`
    pub fn magnitude_from_flux(&self, flux: f64) -> Result<f64, DetectorError> {
        Ok(-2.5 * (flux / self.zeropoint()?).log10())
    }

    /// Flux density of a source with magnitude `magnitude`
    pub fn flux_from_magnitude(&self, magnitude: f64) -> Result<f64, DetectorError> {
        Ok(self.zeropoint()? * 10f64.powf(-magnitude / 2.5))
    }

    /// Convert DN to electrons for an array of any dimensionality.
    pub fn apply_gain<S, D>(&self, values: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let gain = self.params.gain;
        values.mapv(|v| v * gain)
    }

    /// Convert a single DN value to electrons.
    pub fn apply_gain_scalar(&self, value: f64) -> f64 {
        value * self.params.gain
    }

    /// Field-stop radius in pixels, if the detector has one
    pub fn field_stop_radius_px(&self) -> Option<f64> {
        match self.params.field_stop {
            FieldStop::Open => None,
            FieldStop::Circular { radius } => {
                Some(radius.as_arcseconds() / self.params.pixel_scale.as_arcseconds())
            }
        }
    }

    /// Boolean mask of illuminated pixels, shaped `(rows, cols)`.
    pub fn field_stop_mask(&self) -> Array2<bool> {
        let (rows, cols) = self.params.shape;
        match self.field_stop_radius_px() {
            None => Array2::from_elem((rows, cols), true),
            Some(radius) => {
                let (cy, cx) = ((rows / 2) as f64, (cols / 2) as f64);
                let r2 = radius * radius;
                Array2::from_shape_fn((rows, cols), |(r, c)| {
                    let dy = r as f64 - cy;
                    let dx = c as f64 - cx;
                    dx * dx + dy * dy <= r2
                })
            }
        }
    }

    /// Reference pixel used for both projection and rendering, `(x, y)`.
    pub fn center_pixel(&self) -> (usize, usize) {
        (self.naxis1() / 2, self.naxis2() / 2)
    }

    /// TAN projection centred on `(ra, dec)` degrees at this detector's scale.
    pub fn wcs(&self, ra_deg: f64, dec_deg: f64) -> TanWcs {
        let (cx, cy) = self.center_pixel();
        TanWcs::new(
            ra_deg,
            dec_deg,
            (cx as f64, cy as f64),
            self.params.pixel_scale,
            Angle::from_degrees(0.0),
        )
    }
}
