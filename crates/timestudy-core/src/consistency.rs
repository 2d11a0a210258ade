//! Policy for the reported-total consistency check
//!
//! The service reports `total_time_sec` alongside its five components. The
//! client recomputes the sum and compares; what happens on a mismatch is a
//! deployment choice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default tolerance in seconds. The service rounds every metric to
/// milliseconds, so five rounded components can drift from the rounded total
/// by up to 0.003s.
pub const DEFAULT_TOTAL_TOLERANCE_SEC: f64 = 0.01;

/// What a total mismatch turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchSeverity {
    /// Log a warning and keep the result
    #[default]
    Warn,
    /// Reject the response as a schema error
    Error,
}

impl fmt::Display for MismatchSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for MismatchSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown mismatch severity: {}", s)),
        }
    }
}
