//! Machine configuration model
//!
//! Holds the machine-motion and G-code-convention parameters sent along with a
//! program. The field table is explicit: every parameter is a [`ConfigField`]
//! variant with a wire name, a kind and a default. Adding a parameter means
//! adding a variant, never discovering one by iteration over a struct.
//!
//! Edits arrive as raw text. A numeric edit that cannot be parsed leaves the
//! field [`FieldValue::Invalid`] so that submission refuses to proceed and can
//! name the field, instead of quietly falling back to a default.

use crate::error::{SettingsError, SettingsResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use timestudy_core::{FieldIssue, ValidationError};

/// Kind of value a field holds, with its constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Finite and strictly greater than zero
    PositiveReal,
    /// Finite and zero or greater
    NonNegativeReal,
    /// Non-empty G-code mnemonic
    Code,
    /// Boolean switch
    Flag,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::PositiveReal | Self::NonNegativeReal)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositiveReal => write!(f, "number > 0"),
            Self::NonNegativeReal => write!(f, "number >= 0"),
            Self::Code => write!(f, "code"),
            Self::Flag => write!(f, "true/false"),
        }
    }
}

/// One entry of the machine configuration field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigField {
    RapidAccelG,
    CutAccelG,
    PierceTime,
    LifterTime,
    DefaultRapidIpm,
    DefaultCutIpm,
    BeamOnCode,
    BeamOffCode,
    InchModeCode,
    MetricModeCode,
    AbsModeCode,
    RelModeCode,
    FollowProgramArcs,
}

impl ConfigField {
    /// Number of fields in the table.
    pub const COUNT: usize = 13;

    /// Every field, in table (and wire) order.
    pub const ALL: [ConfigField; Self::COUNT] = [
        Self::RapidAccelG,
        Self::CutAccelG,
        Self::PierceTime,
        Self::LifterTime,
        Self::DefaultRapidIpm,
        Self::DefaultCutIpm,
        Self::BeamOnCode,
        Self::BeamOffCode,
        Self::InchModeCode,
        Self::MetricModeCode,
        Self::AbsModeCode,
        Self::RelModeCode,
        Self::FollowProgramArcs,
    ];

    /// Name used for the multipart form part.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RapidAccelG => "rapid_accel_g",
            Self::CutAccelG => "cut_accel_g",
            Self::PierceTime => "pierce_time",
            Self::LifterTime => "lifter_time",
            Self::DefaultRapidIpm => "default_rapid_ipm",
            Self::DefaultCutIpm => "default_cut_ipm",
            Self::BeamOnCode => "beam_on_code",
            Self::BeamOffCode => "beam_off_code",
            Self::InchModeCode => "inch_mode_code",
            Self::MetricModeCode => "metric_mode_code",
            Self::AbsModeCode => "abs_mode_code",
            Self::RelModeCode => "rel_mode_code",
            Self::FollowProgramArcs => "followProgramArcs",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::RapidAccelG | Self::CutAccelG | Self::DefaultRapidIpm | Self::DefaultCutIpm => {
                FieldKind::PositiveReal
            }
            Self::PierceTime | Self::LifterTime => FieldKind::NonNegativeReal,
            Self::BeamOnCode
            | Self::BeamOffCode
            | Self::InchModeCode
            | Self::MetricModeCode
            | Self::AbsModeCode
            | Self::RelModeCode => FieldKind::Code,
            Self::FollowProgramArcs => FieldKind::Flag,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RapidAccelG => "Acceleration during rapid (non-cutting) moves, in g",
            Self::CutAccelG => "Acceleration during cutting moves, in g",
            Self::PierceTime => "Seconds spent piercing before each cut",
            Self::LifterTime => "Seconds per Z-lifter actuation",
            Self::DefaultRapidIpm => "Fallback rapid feed rate (in/min)",
            Self::DefaultCutIpm => "Fallback cut feed rate (in/min)",
            Self::BeamOnCode => "Code that turns the beam on",
            Self::BeamOffCode => "Code that turns the beam off",
            Self::InchModeCode => "Code that selects inch units",
            Self::MetricModeCode => "Code that selects metric units",
            Self::AbsModeCode => "Code that selects absolute positioning",
            Self::RelModeCode => "Code that selects relative positioning",
            Self::FollowProgramArcs => {
                "Interpret arc centers in the program's positioning mode"
            }
        }
    }

    /// Default value, matching the analysis service's own defaults.
    pub fn default_value(&self) -> FieldValue {
        let defaults = MachineConfig::default();
        defaults.value(*self)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigField {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| SettingsError::UnknownField(s.to_string()))
    }
}

/// Current value of a field as edited
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Raw input that could not be coerced to the field's kind
    Invalid { raw: String, reason: String },
}

impl FieldValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{}", b),
            Self::Invalid { raw, .. } => write!(f, "{} (invalid)", raw),
        }
    }
}

/// Validated machine configuration, ready for transmission
///
/// Only produced by [`ConfigurationModel::validate`], so every instance
/// satisfies the field constraints. Code fields are trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineConfig {
    pub rapid_accel_g: f64,
    pub cut_accel_g: f64,
    pub pierce_time: f64,
    pub lifter_time: f64,
    pub default_rapid_ipm: f64,
    pub default_cut_ipm: f64,
    pub beam_on_code: String,
    pub beam_off_code: String,
    pub inch_mode_code: String,
    pub metric_mode_code: String,
    pub abs_mode_code: String,
    pub rel_mode_code: String,
    #[serde(rename = "followProgramArcs")]
    pub follow_program_arcs: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            rapid_accel_g: 1.0,
            cut_accel_g: 0.5,
            pierce_time: 1.0,
            lifter_time: 0.5,
            default_rapid_ipm: 500.0,
            default_cut_ipm: 100.0,
            beam_on_code: "M07".to_string(),
            beam_off_code: "M08".to_string(),
            inch_mode_code: "G70".to_string(),
            metric_mode_code: "G71".to_string(),
            abs_mode_code: "G90".to_string(),
            rel_mode_code: "G91".to_string(),
            follow_program_arcs: false,
        }
    }
}

impl MachineConfig {
    /// Value of one field.
    pub fn value(&self, field: ConfigField) -> FieldValue {
        match field {
            ConfigField::RapidAccelG => FieldValue::Number(self.rapid_accel_g),
            ConfigField::CutAccelG => FieldValue::Number(self.cut_accel_g),
            ConfigField::PierceTime => FieldValue::Number(self.pierce_time),
            ConfigField::LifterTime => FieldValue::Number(self.lifter_time),
            ConfigField::DefaultRapidIpm => FieldValue::Number(self.default_rapid_ipm),
            ConfigField::DefaultCutIpm => FieldValue::Number(self.default_cut_ipm),
            ConfigField::BeamOnCode => FieldValue::Text(self.beam_on_code.clone()),
            ConfigField::BeamOffCode => FieldValue::Text(self.beam_off_code.clone()),
            ConfigField::InchModeCode => FieldValue::Text(self.inch_mode_code.clone()),
            ConfigField::MetricModeCode => FieldValue::Text(self.metric_mode_code.clone()),
            ConfigField::AbsModeCode => FieldValue::Text(self.abs_mode_code.clone()),
            ConfigField::RelModeCode => FieldValue::Text(self.rel_mode_code.clone()),
            ConfigField::FollowProgramArcs => FieldValue::Flag(self.follow_program_arcs),
        }
    }

    fn assign(&mut self, field: ConfigField, value: Checked) {
        match (field, value) {
            (ConfigField::RapidAccelG, Checked::Number(v)) => self.rapid_accel_g = v,
            (ConfigField::CutAccelG, Checked::Number(v)) => self.cut_accel_g = v,
            (ConfigField::PierceTime, Checked::Number(v)) => self.pierce_time = v,
            (ConfigField::LifterTime, Checked::Number(v)) => self.lifter_time = v,
            (ConfigField::DefaultRapidIpm, Checked::Number(v)) => self.default_rapid_ipm = v,
            (ConfigField::DefaultCutIpm, Checked::Number(v)) => self.default_cut_ipm = v,
            (ConfigField::BeamOnCode, Checked::Text(s)) => self.beam_on_code = s,
            (ConfigField::BeamOffCode, Checked::Text(s)) => self.beam_off_code = s,
            (ConfigField::InchModeCode, Checked::Text(s)) => self.inch_mode_code = s,
            (ConfigField::MetricModeCode, Checked::Text(s)) => self.metric_mode_code = s,
            (ConfigField::AbsModeCode, Checked::Text(s)) => self.abs_mode_code = s,
            (ConfigField::RelModeCode, Checked::Text(s)) => self.rel_mode_code = s,
            (ConfigField::FollowProgramArcs, Checked::Flag(b)) => self.follow_program_arcs = b,
            // check_field only yields the variant matching the field's kind
            _ => {}
        }
    }
}

enum Checked {
    Number(f64),
    Text(String),
    Flag(bool),
}

fn check_field(field: ConfigField, value: &FieldValue) -> Result<Checked, FieldIssue> {
    let name = field.name();
    match (field.kind(), value) {
        (_, FieldValue::Invalid { raw, reason }) => Err(FieldIssue::new(
            name,
            format!("'{}' is not valid: {}", raw, reason),
        )),
        (FieldKind::PositiveReal, FieldValue::Number(v)) => {
            if !v.is_finite() {
                Err(FieldIssue::new(name, "must be a finite number"))
            } else if *v <= 0.0 {
                Err(FieldIssue::new(name, "must be greater than 0"))
            } else {
                Ok(Checked::Number(*v))
            }
        }
        (FieldKind::NonNegativeReal, FieldValue::Number(v)) => {
            if !v.is_finite() {
                Err(FieldIssue::new(name, "must be a finite number"))
            } else if *v < 0.0 {
                Err(FieldIssue::new(name, "must not be negative"))
            } else {
                Ok(Checked::Number(*v))
            }
        }
        (FieldKind::Code, FieldValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(FieldIssue::new(name, "must not be empty"))
            } else {
                Ok(Checked::Text(trimmed.to_string()))
            }
        }
        (FieldKind::Flag, FieldValue::Flag(b)) => Ok(Checked::Flag(*b)),
        (kind, other) => Err(FieldIssue::new(
            name,
            format!("expected {}, got '{}'", kind, other),
        )),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Editable machine configuration owned by a session
///
/// Created with the service defaults, mutated through [`set`](Self::set) and
/// [`toggle`](Self::toggle), and turned into a [`MachineConfig`] by
/// [`validate`](Self::validate) at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationModel {
    values: [FieldValue; ConfigField::COUNT],
}

impl Default for ConfigurationModel {
    fn default() -> Self {
        Self::from_config(&MachineConfig::default())
    }
}

impl From<&MachineConfig> for ConfigurationModel {
    fn from(config: &MachineConfig) -> Self {
        Self::from_config(config)
    }
}

impl ConfigurationModel {
    /// Create a model holding the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model seeded from a validated configuration
    pub fn from_config(config: &MachineConfig) -> Self {
        Self {
            values: std::array::from_fn(|i| config.value(ConfigField::ALL[i])),
        }
    }

    /// Current value of a field
    pub fn get(&self, field: ConfigField) -> &FieldValue {
        &self.values[field.index()]
    }

    /// All fields with their current values, in table order
    pub fn values(&self) -> impl Iterator<Item = (ConfigField, &FieldValue)> + '_ {
        ConfigField::ALL
            .iter()
            .map(move |field| (*field, &self.values[field.index()]))
    }

    /// Apply a raw textual edit to a field
    ///
    /// Numeric and boolean edits that cannot be coerced store the field as
    /// invalid and return an error naming it. Code fields accept any text;
    /// emptiness is only rejected by [`validate`](Self::validate).
    pub fn set(&mut self, field: ConfigField, raw: &str) -> SettingsResult<()> {
        let value = match field.kind() {
            FieldKind::PositiveReal | FieldKind::NonNegativeReal => {
                match raw.trim().parse::<f64>() {
                    Ok(v) => FieldValue::Number(v),
                    Err(e) => FieldValue::Invalid {
                        raw: raw.to_string(),
                        reason: e.to_string(),
                    },
                }
            }
            FieldKind::Code => FieldValue::Text(raw.to_string()),
            FieldKind::Flag => match parse_flag(raw) {
                Some(b) => FieldValue::Flag(b),
                None => FieldValue::Invalid {
                    raw: raw.to_string(),
                    reason: "expected true or false".to_string(),
                },
            },
        };

        let result = match &value {
            FieldValue::Invalid { raw, reason } => {
                tracing::debug!("Field {} marked invalid: '{}' ({})", field, raw, reason);
                Err(SettingsError::InvalidSetting {
                    key: field.name().to_string(),
                    reason: format!("'{}' is not valid: {}", raw, reason),
                })
            }
            _ => Ok(()),
        };

        self.values[field.index()] = value;
        result
    }

    /// Apply a raw edit addressed by wire name
    pub fn set_by_name(&mut self, name: &str, raw: &str) -> SettingsResult<()> {
        let field: ConfigField = name.parse()?;
        self.set(field, raw)
    }

    /// Flip a boolean field, returning its new value
    ///
    /// An invalid flag is treated as `false` before flipping, so toggling
    /// always leaves the field valid.
    pub fn toggle(&mut self, field: ConfigField) -> SettingsResult<bool> {
        if field.kind() != FieldKind::Flag {
            return Err(SettingsError::WrongKind {
                field: field.name(),
                expected: "boolean",
            });
        }

        let current = matches!(self.get(field), FieldValue::Flag(true));
        self.values[field.index()] = FieldValue::Flag(!current);
        Ok(!current)
    }

    /// Restore every field to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fields currently holding input that could not be coerced
    pub fn invalid_fields(&self) -> Vec<ConfigField> {
        self.values()
            .filter(|(_, value)| value.is_invalid())
            .map(|(field, _)| field)
            .collect()
    }

    /// Check every field and produce the configuration to transmit
    ///
    /// Reports all failing fields at once, in table order.
    pub fn validate(&self) -> Result<MachineConfig, ValidationError> {
        let mut config = MachineConfig::default();
        let mut issues = Vec::new();

        for (field, value) in self.values() {
            match check_field(field, value) {
                Ok(checked) => config.assign(field, checked),
                Err(issue) => issues.push(issue),
            }
        }

        if issues.is_empty() {
            Ok(config)
        } else {
            Err(ValidationError::InvalidFields { issues })
        }
    }
}
