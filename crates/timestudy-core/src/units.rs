//! Modal state enumerations and duration formatting
//!
//! The analysis service reports the unit system and positioning mode that were
//! active when the program finished. Both are closed enumerations on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system selected by the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Inch mode
    Inch,
    /// Metric mode (mm)
    Metric,
}

impl Units {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inch => "inch",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inch => write!(f, "Inch"),
            Self::Metric => write!(f, "Metric"),
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inch" => Ok(Self::Inch),
            "metric" => Ok(Self::Metric),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

/// Positioning mode selected by the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Absolute coordinates
    Absolute,
    /// Coordinates relative to the current position
    Relative,
}

impl Positioning {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
        }
    }
}

impl fmt::Display for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => write!(f, "Absolute"),
            Self::Relative => write!(f, "Relative"),
        }
    }
}

impl FromStr for Positioning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(Self::Absolute),
            "relative" => Ok(Self::Relative),
            _ => Err(format!("Unknown positioning mode: {}", s)),
        }
    }
}

/// Format a duration in seconds as `h:mm:ss.s`
///
/// Negative and non-finite inputs are rendered verbatim since the service is the
/// source of truth and a strange value should stay visible.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return format!("{}s", seconds);
    }

    // Round to tenths first so 59.96 becomes 1:00.0 rather than 0:60.0
    let tenths = (seconds * 10.0).round() as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths / 600) % 60;
    let secs = (tenths % 600) as f64 / 10.0;

    format!("{}:{:02}:{:04.1}", hours, minutes, secs)
}
