//! Unit conversion utilities
//!
//! Board geometry is stored as integer nanometres. These helpers convert to
//! and from millimetres / inches for display and for the exporters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nanometres per millimetre.
pub const NM_PER_MM: i64 = 1_000_000;

/// Nanometres per inch.
pub const NM_PER_INCH: i64 = 25_400_000;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Converts nanometres to millimetres.
pub fn nm_to_mm(nm: i64) -> f64 {
    nm as f64 / NM_PER_MM as f64
}

/// Converts millimetres to nanometres, rounding to the nearest nanometre.
pub fn mm_to_nm(mm: f64) -> i64 {
    (mm * NM_PER_MM as f64).round() as i64
}

/// Converts nanometres to inches.
pub fn nm_to_inch(nm: i64) -> f64 {
    nm as f64 / NM_PER_INCH as f64
}

/// Format a length for display
///
/// * `nm` - Length in nanometres
/// * `system` - Target measurement system
pub fn format_length(nm: i64, system: MeasurementSystem) -> String {
    match system {
        MeasurementSystem::Metric => format!("{:.2} mm", nm_to_mm(nm)),
        MeasurementSystem::Imperial => format!("{:.3} in", nm_to_inch(nm)),
    }
}

/// Parse a length string ("1.5", "1.5mm", "0.1in") into nanometres.
///
/// A bare number is interpreted in `system`.
pub fn parse_length(input: &str, system: MeasurementSystem) -> Result<i64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty length".to_string());
    }

    let (number, unit) = if let Some(v) = input.strip_suffix("mm") {
        (v, MeasurementSystem::Metric)
    } else if let Some(v) = input.strip_suffix("in") {
        (v, MeasurementSystem::Imperial)
    } else {
        (input, system)
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("Invalid length: {}", input))?;

    Ok(match unit {
        MeasurementSystem::Metric => mm_to_nm(value),
        MeasurementSystem::Imperial => (value * NM_PER_INCH as f64).round() as i64,
    })
}
