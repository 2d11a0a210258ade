//! Client settings
//!
//! Deployment knobs for talking to the analysis service: where it lives, how
//! long to wait for it, the preview canvas size, and how strictly to treat an
//! inconsistent total. Stored as TOML; every key is optional.
//!
//! Machine parameters are not stored here; they live only in the session's
//! [`ConfigurationModel`](crate::ConfigurationModel).

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use timestudy_core::{MismatchSeverity, DEFAULT_TOTAL_TOLERANCE_SEC};
use url::Url;

/// Endpoint used when neither the environment nor a settings file provides one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/analyze";

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV_VAR: &str = "TIMESTUDY_API_URL";

/// Client settings for the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Analysis endpoint URL
    pub endpoint: String,
    /// Transfer timeout in milliseconds
    pub timeout_ms: u64,
    /// Preview canvas width in pixels
    pub canvas_width: u32,
    /// Preview canvas height in pixels
    pub canvas_height: u32,
    /// Allowed difference between reported and recomputed total, in seconds
    pub total_tolerance_sec: f64,
    /// How to treat a total mismatch
    pub mismatch_severity: MismatchSeverity,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 60_000,
            canvas_width: 400,
            canvas_height: 400,
            total_tolerance_sec: DEFAULT_TOTAL_TOLERANCE_SEC,
            mismatch_severity: MismatchSeverity::default(),
        }
    }
}

impl ClientSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the settings file, e.g. `~/.config/timestudy/client.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("timestudy").join("client.toml"))
    }

    /// Load settings from a TOML file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        tracing::debug!("Loaded client settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from an explicit path, else the platform file if present,
    /// else defaults
    ///
    /// An explicit path that cannot be read is an error; a missing platform
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        parse_endpoint(&self.endpoint)?;

        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be > 0"));
        }

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(invalid("canvas", "dimensions must be > 0"));
        }

        if !self.total_tolerance_sec.is_finite() || self.total_tolerance_sec < 0.0 {
            return Err(invalid(
                "total_tolerance_sec",
                "must be a finite number >= 0",
            ));
        }

        Ok(())
    }

    /// Resolve the endpoint against the process environment
    pub fn resolve_endpoint(&self) -> SettingsResult<String> {
        self.resolve_endpoint_with(std::env::var(ENDPOINT_ENV_VAR).ok())
    }

    /// Resolve the endpoint given an optional override value
    ///
    /// A blank override is ignored. The winner must be an http(s) URL.
    pub fn resolve_endpoint_with(&self, env_override: Option<String>) -> SettingsResult<String> {
        let endpoint = match env_override {
            Some(value) if !value.trim().is_empty() => {
                tracing::debug!("Endpoint overridden by {}", ENDPOINT_ENV_VAR);
                value.trim().to_string()
            }
            _ => self.endpoint.clone(),
        };

        parse_endpoint(&endpoint)?;
        Ok(endpoint)
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_endpoint(endpoint: &str) -> SettingsResult<Url> {
    let url = Url::parse(endpoint).map_err(|e| invalid("endpoint", &e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(
            "endpoint",
            &format!("unsupported scheme '{}'", other),
        )),
    }
}
