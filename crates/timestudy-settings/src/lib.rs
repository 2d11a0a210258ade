//! timestudy Settings Crate
//!
//! The editable machine configuration submitted with each program, and the
//! client settings that locate and bound the analysis service.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ClientSettings, DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR};
pub use config::{ConfigField, ConfigurationModel, FieldKind, FieldValue, MachineConfig};
pub use error::{SettingsError, SettingsResult};
