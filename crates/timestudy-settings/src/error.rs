//! Error types for the settings crate.
//!
//! This module provides structured error types for the machine configuration
//! model and for loading client settings.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be loaded.
    #[error("Failed to load settings from {path}: {reason}")]
    LoadError { path: String, reason: String },

    /// A setting value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The field name is not part of the machine configuration.
    #[error("Unknown configuration field: {0}")]
    UnknownField(String),

    /// The operation does not apply to this kind of field.
    #[error("Field '{field}' is not a {expected} field")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::InvalidSetting {
            key: "rapid_accel_g".to_string(),
            reason: "'fast' is not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'rapid_accel_g': 'fast' is not a number"
        );

        let err = SettingsError::UnknownField("laser_power".to_string());
        assert_eq!(err.to_string(), "Unknown configuration field: laser_power");

        let err = SettingsError::WrongKind {
            field: "pierce_time",
            expected: "boolean",
        };
        assert_eq!(err.to_string(), "Field 'pierce_time' is not a boolean field");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
