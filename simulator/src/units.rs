//! Type-safe physical units for the instrument model.
//!
//! Quantities that cross module boundaries are carried as `uom` types so a
//! wavelength can never be confused with a pixel size or a temperature.
//! Textual quantities coming from configuration must carry an explicit unit
//! tag (`"0.54 um"`, `"10 degC"`); a bare number is rejected with
//! [`UnitError::MissingUnit`].

use std::time::Duration;

use thiserror::Error;
use uom::si::angle::{degree, minute as arcminute, radian, second as arcsecond};
use uom::si::f64::*;
use uom::si::length::{angstrom, centimeter, meter, micrometer, millimeter, nanometer};
use uom::si::thermodynamic_temperature::{degree_celsius, kelvin};

/// Type alias for temperature with convenient methods
pub type Temperature = ThermodynamicTemperature;

/// Type alias for length measurements
pub type Length = uom::si::f64::Length;

/// Wavelengths are lengths; the alias documents intent at call sites.
pub type Wavelength = Length;

/// Type alias for plane angles
pub type Angle = uom::si::f64::Angle;

/// Errors for tagged quantity parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("Quantity '{0}' has no unit; pass a value with units")]
    MissingUnit(String),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Unit '{unit}' is not a {expected}")]
    WrongDimension { expected: &'static str, unit: String },

    #[error("Could not parse a number from '{0}'")]
    InvalidNumber(String),

    #[error("Quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// Extension trait for temperature conversions
pub trait TemperatureExt {
    /// Create temperature from degrees Celsius
    fn from_celsius(celsius: f64) -> Self;

    /// Get temperature in degrees Celsius
    fn as_celsius(&self) -> f64;

    /// Create temperature from Kelvin
    fn from_kelvin(kelvin: f64) -> Self;

    /// Get temperature in Kelvin
    fn as_kelvin(&self) -> f64;
}

/// Extension trait for length conversions used for wavelengths and pixels
pub trait LengthExt {
    fn from_angstroms(aa: f64) -> Self;
    fn as_angstroms(&self) -> f64;
    fn from_nanometers(nm: f64) -> Self;
    fn as_nanometers(&self) -> f64;
    fn from_micrometers(um: f64) -> Self;
    fn as_micrometers(&self) -> f64;
    fn from_millimeters(mm: f64) -> Self;
    fn as_millimeters(&self) -> f64;
    fn from_centimeters(cm: f64) -> Self;
    fn as_centimeters(&self) -> f64;
    fn from_meters(m: f64) -> Self;
    fn as_meters(&self) -> f64;
}

/// Extension trait for angle conversions
pub trait AngleExt {
    fn from_degrees(deg: f64) -> Self;
    fn as_degrees(&self) -> f64;
    fn from_arcseconds(arcsec: f64) -> Self;
    fn as_arcseconds(&self) -> f64;
    fn from_radians(rad: f64) -> Self;
    fn as_radians(&self) -> f64;
}

impl TemperatureExt for Temperature {
    fn from_celsius(celsius: f64) -> Self {
        Temperature::new::<degree_celsius>(celsius)
    }

    fn as_celsius(&self) -> f64 {
        self.get::<degree_celsius>()
    }

    fn from_kelvin(k: f64) -> Self {
        Temperature::new::<kelvin>(k)
    }

    fn as_kelvin(&self) -> f64 {
        self.get::<kelvin>()
    }
}

impl LengthExt for Length {
    fn from_angstroms(aa: f64) -> Self {
        Length::new::<angstrom>(aa)
    }

    fn as_angstroms(&self) -> f64 {
        self.get::<angstrom>()
    }

    fn from_nanometers(nm: f64) -> Self {
        Length::new::<nanometer>(nm)
    }

    fn as_nanometers(&self) -> f64 {
        self.get::<nanometer>()
    }

    fn from_micrometers(um: f64) -> Self {
        Length::new::<micrometer>(um)
    }

    fn as_micrometers(&self) -> f64 {
        self.get::<micrometer>()
    }

    fn from_millimeters(mm: f64) -> Self {
        Length::new::<millimeter>(mm)
    }

    fn as_millimeters(&self) -> f64 {
        self.get::<millimeter>()
    }

    fn from_centimeters(cm: f64) -> Self {
        Length::new::<centimeter>(cm)
    }

    fn as_centimeters(&self) -> f64 {
        self.get::<centimeter>()
    }

    fn from_meters(m: f64) -> Self {
        Length::new::<meter>(m)
    }

    fn as_meters(&self) -> f64 {
        self.get::<meter>()
    }
}

impl AngleExt for Angle {
    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_degrees(&self) -> f64 {
        self.get::<degree>()
    }

    fn from_arcseconds(arcsec: f64) -> Self {
        Angle::new::<arcsecond>(arcsec)
    }

    fn as_arcseconds(&self) -> f64 {
        self.get::<arcsecond>()
    }

    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}

/// Split `"<number> <unit>"` (whitespace optional) into its parts.
fn split_tagged(text: &str) -> Result<(f64, &str), UnitError> {
    let trimmed = text.trim();
    let split = trimmed
        .char_indices()
        .find(|&(i, c)| {
            if c.is_ascii_digit() || c == '.' || c == '+' || c == '-' {
                return false;
            }
            if c == 'e' || c == 'E' {
                // Exponent marker only when followed by a digit or sign
                let next = trimmed[i + c.len_utf8()..].chars().next();
                return !matches!(next, Some(n) if n.is_ascii_digit() || n == '+' || n == '-');
            }
            true
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| UnitError::InvalidNumber(text.to_string()))?;
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(UnitError::MissingUnit(text.to_string()));
    }
    if !value.is_finite() {
        return Err(UnitError::OutOfRange(text.to_string()));
    }
    Ok((value, unit))
}

fn dimension_of(unit: &str) -> Option<&'static str> {
    match unit {
        "nm" | "um" | "µm" | "micron" | "microns" | "mm" | "cm" | "m" | "AA" | "Å"
        | "angstrom" => Some("length"),
        "degC" | "deg_C" | "C" | "°C" | "K" => Some("temperature"),
        "s" | "ms" | "us" | "min" => Some("time"),
        "deg" | "arcmin" | "arcsec" | "rad" => Some("angle"),
        "pix" | "px" | "pixel" | "pixels" => Some("pixel count"),
        _ => None,
    }
}

fn wrong_dimension(expected: &'static str, unit: &str) -> UnitError {
    match dimension_of(unit) {
        Some(_) => UnitError::WrongDimension {
            expected,
            unit: unit.to_string(),
        },
        None => UnitError::UnknownUnit(unit.to_string()),
    }
}

/// Parse a tagged wavelength such as `"0.54 um"` or `"540nm"`.
pub fn parse_wavelength(text: &str) -> Result<Wavelength, UnitError> {
    let (value, unit) = split_tagged(text)?;
    let length = match unit {
        "nm" => Length::from_nanometers(value),
        "um" | "µm" | "micron" | "microns" => Length::from_micrometers(value),
        "mm" => Length::from_millimeters(value),
        "cm" => Length::from_centimeters(value),
        "m" => Length::from_meters(value),
        "AA" | "Å" | "angstrom" => Length::from_angstroms(value),
        other => return Err(wrong_dimension("length", other)),
    };
    Ok(length)
}

/// Parse a tagged temperature such as `"10 degC"` or `"283.15 K"`.
pub fn parse_temperature(text: &str) -> Result<Temperature, UnitError> {
    let (value, unit) = split_tagged(text)?;
    match unit {
        "degC" | "deg_C" | "C" | "°C" => Ok(Temperature::from_celsius(value)),
        "K" if value >= 0.0 => Ok(Temperature::from_kelvin(value)),
        "K" => Err(UnitError::OutOfRange(text.to_string())),
        other => Err(wrong_dimension("temperature", other)),
    }
}

/// Parse a tagged, non-negative duration such as `"1 s"` or `"200 ms"`.
pub fn parse_duration(text: &str) -> Result<Duration, UnitError> {
    let (value, unit) = split_tagged(text)?;
    let seconds = match unit {
        "s" => value,
        "ms" => value * 1e-3,
        "us" => value * 1e-6,
        "min" => value * 60.0,
        other => return Err(wrong_dimension("time", other)),
    };
    if seconds < 0.0 {
        return Err(UnitError::OutOfRange(text.to_string()));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| UnitError::OutOfRange(text.to_string()))
}

/// Parse a tagged angle such as `"0.155 deg"` or `"1.19 arcsec"`.
pub fn parse_angle(text: &str) -> Result<Angle, UnitError> {
    let (value, unit) = split_tagged(text)?;
    let angle = match unit {
        "deg" => Angle::from_degrees(value),
        "arcmin" => Angle::new::<arcminute>(value),
        "arcsec" => Angle::from_arcseconds(value),
        "rad" => Angle::from_radians(value),
        other => return Err(wrong_dimension("angle", other)),
    };
    Ok(angle)
}

/// Parse a tagged pixel count such as `"2 pix"`, returning pixels.
pub fn parse_pixels(text: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_tagged(text)?;
    match unit {
        "pix" | "px" | "pixel" | "pixels" => Ok(value),
        other => Err(wrong_dimension("pixel count", other)),
    }
}
