//! Request building
//!
//! Packages a program file and a validated machine configuration into a single
//! multipart submission. Validation happens here, before anything touches the
//! network: a missing file or any invalid field stops the build.
//!
//! Every configuration field becomes one text part named exactly as in the
//! field table. Numbers use Rust's `Display` for `f64`, which is locale
//! independent: no grouping separators, `.` as decimal point, no exponent.

use std::path::Path;

use timestudy_core::{TransferError, ValidationError};
use timestudy_settings::{ConfigField, ConfigurationModel, MachineConfig};
use url::Url;

/// Name of the multipart part carrying the program bytes.
pub const FILE_PART: &str = "file";

/// A selected G-code program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFile {
    /// File name sent to the service and echoed back
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ProgramFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a program from disk, using the final path component as its name
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Body of one multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

/// One named multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub body: PartBody,
}

/// A fully validated submission, ready for transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPayload {
    endpoint: Url,
    parts: Vec<Part>,
}

impl TransferPayload {
    /// Address the payload is destined for
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Parts in the order they will be sent
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Text value of a named part
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.body {
            PartBody::Text(value) if part.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// File name and bytes of the file part
    pub fn file(&self) -> Option<(&str, &[u8])> {
        self.parts.iter().find_map(|part| match &part.body {
            PartBody::File { file_name, bytes } => Some((file_name.as_str(), bytes.as_slice())),
            PartBody::Text(_) => None,
        })
    }

    /// Total size of all part bodies in bytes
    pub fn body_size(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match &part.body {
                PartBody::Text(value) => value.len(),
                PartBody::File { bytes, .. } => bytes.len(),
            })
            .sum()
    }

    /// Split into endpoint and a multipart form for reqwest
    pub fn into_form(self) -> (Url, reqwest::multipart::Form) {
        let form = self
            .parts
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, part| match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::File { file_name, bytes } => form.part(
                    part.name,
                    reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                ),
            });
        (self.endpoint, form)
    }
}

/// Builds submissions for one analysis endpoint
///
/// The endpoint is resolved by the caller (environment override, settings
/// file, or default) and injected here.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: Url,
}

impl RequestBuilder {
    pub fn new(endpoint: &str) -> Result<Self, TransferError> {
        let endpoint = Url::parse(endpoint).map_err(|e| TransferError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransferError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Validate inputs and package them
    ///
    /// Produces one part per configuration field plus the file part.
    pub fn build(
        &self,
        file: Option<&ProgramFile>,
        config: &ConfigurationModel,
    ) -> Result<TransferPayload, ValidationError> {
        let file = file.ok_or(ValidationError::MissingFile)?;
        let config = config.validate()?;

        let mut parts = Vec::with_capacity(ConfigField::COUNT + 1);
        parts.push(Part {
            name: FILE_PART.to_string(),
            body: PartBody::File {
                file_name: file.name.clone(),
                bytes: file.bytes.clone(),
            },
        });

        for field in ConfigField::ALL {
            parts.push(Part {
                name: field.name().to_string(),
                body: PartBody::Text(encode_field(&config, field)),
            });
        }

        tracing::debug!(
            "Built payload for {} with {} parts ({} bytes of program)",
            file.name,
            parts.len(),
            file.bytes.len()
        );

        Ok(TransferPayload {
            endpoint: self.endpoint.clone(),
            parts,
        })
    }
}

fn encode_field(config: &MachineConfig, field: ConfigField) -> String {
    match field {
        ConfigField::RapidAccelG => encode_number(config.rapid_accel_g),
        ConfigField::CutAccelG => encode_number(config.cut_accel_g),
        ConfigField::PierceTime => encode_number(config.pierce_time),
        ConfigField::LifterTime => encode_number(config.lifter_time),
        ConfigField::DefaultRapidIpm => encode_number(config.default_rapid_ipm),
        ConfigField::DefaultCutIpm => encode_number(config.default_cut_ipm),
        ConfigField::BeamOnCode => encode_code(&config.beam_on_code),
        ConfigField::BeamOffCode => encode_code(&config.beam_off_code),
        ConfigField::InchModeCode => encode_code(&config.inch_mode_code),
        ConfigField::MetricModeCode => encode_code(&config.metric_mode_code),
        ConfigField::AbsModeCode => encode_code(&config.abs_mode_code),
        ConfigField::RelModeCode => encode_code(&config.rel_mode_code),
        ConfigField::FollowProgramArcs => encode_flag(config.follow_program_arcs),
    }
}

/// Locale-independent decimal rendering
pub fn encode_number(value: f64) -> String {
    format!("{}", value)
}

pub fn encode_code(value: &str) -> String {
    value.to_string()
}

pub fn encode_flag(value: bool) -> String {
    String::from(if value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("http://localhost:8000/analyze").unwrap()
    }

    #[test]
    fn test_encode_number_is_plain_decimal() {
        assert_eq!(encode_number(1.0), "1");
        assert_eq!(encode_number(0.5), "0.5");
        assert_eq!(encode_number(1234567.25), "1234567.25");
        assert_eq!(encode_number(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_encode_flag_literals() {
        assert_eq!(encode_flag(true), "true");
        assert_eq!(encode_flag(false), "false");
    }

    #[test]
    fn test_build_requires_file() {
        let model = ConfigurationModel::new();
        assert_eq!(
            builder().build(None, &model),
            Err(ValidationError::MissingFile)
        );
    }

    #[test]
    fn test_build_default_payload() {
        let file = ProgramFile::new("part.nc", b"G0 X1 Y1\n".to_vec());
        let payload = builder().build(Some(&file), &ConfigurationModel::new()).unwrap();

        assert_eq!(payload.len(), ConfigField::COUNT + 1);
        assert_eq!(payload.file(), Some(("part.nc", &b"G0 X1 Y1\n"[..])));
        assert_eq!(payload.text("rapid_accel_g"), Some("1"));
        assert_eq!(payload.text("cut_accel_g"), Some("0.5"));
        assert_eq!(payload.text("beam_off_code"), Some("M08"));
        assert_eq!(payload.text("followProgramArcs"), Some("false"));
        assert_eq!(payload.endpoint().as_str(), "http://localhost:8000/analyze");
    }

    #[test]
    fn test_build_rejects_zero_acceleration() {
        let file = ProgramFile::new("part.nc", Vec::new());
        let mut model = ConfigurationModel::new();
        model.set(ConfigField::RapidAccelG, "0").unwrap();

        let err = builder().build(Some(&file), &model).unwrap_err();
        assert_eq!(err.field_names(), vec!["rapid_accel_g"]);

        model.set(ConfigField::RapidAccelG, "1.0").unwrap();
        assert!(builder().build(Some(&file), &model).is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_endpoint() {
        assert!(matches!(
            RequestBuilder::new("localhost:8000"),
            Err(TransferError::InvalidEndpoint { .. })
        ));
        assert!(RequestBuilder::new("file:///tmp/analyze").is_err());
    }
}
