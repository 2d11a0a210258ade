//! Error handling for timestudy
//!
//! Every failure belongs to exactly one stage of a submission:
//! - Validation errors (local input, detected before any network call)
//! - Transfer errors (the HTTP exchange with the analysis service)
//! - Schema errors (the response body does not match the expected contract)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::fmt;
use thiserror::Error;

/// A single configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Wire name of the field.
    pub field: String,
    /// Human readable reason.
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

struct IssueList<'a>(&'a [FieldIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Validation error type
///
/// Raised for malformed or missing local input. Never involves the network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No program file was selected
    #[error("No G-code file selected")]
    MissingFile,

    /// One or more configuration fields are invalid or empty
    #[error("Invalid configuration: {}", IssueList(.issues))]
    InvalidFields {
        /// Every failing field, in field-table order.
        issues: Vec<FieldIssue>,
    },
}

impl ValidationError {
    /// Names of the fields that failed, if any.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::MissingFile => Vec::new(),
            Self::InvalidFields { issues } => issues.iter().map(|i| i.field.as_str()).collect(),
        }
    }
}

/// Transfer error type
///
/// Represents a failed exchange with the analysis service. The core never retries;
/// callers decide what to do with the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    /// The configured endpoint cannot be used
    #[error("Invalid service endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        endpoint: String,
        /// Why it was refused.
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to initialize HTTP client: {reason}")]
    Client {
        /// The reason client construction failed.
        reason: String,
    },

    /// The service could not be reached
    #[error("Cannot reach analysis service at {endpoint}: {reason}")]
    Connectivity {
        /// The endpoint that was contacted.
        endpoint: String,
        /// The underlying transport failure.
        reason: String,
    },

    /// The service did not answer in time
    #[error("Analysis service did not respond within {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The service answered with a non-success status
    #[error("Analysis service rejected the request (HTTP {status}): {detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Detail extracted from the response body.
        detail: String,
    },

    /// The response body could not be read
    #[error("Failed to read analysis response: {reason}")]
    Body {
        /// The reason the body could not be read.
        reason: String,
    },
}

impl TransferError {
    /// True when the failure is a reachability problem rather than a rejection.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Timeout { .. })
    }

    /// True when the service answered but refused the input.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Schema error type
///
/// The response body does not follow the analysis contract. Interpretation is
/// all-or-nothing, so any of these means no result was produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Body is not valid JSON
    #[error("Response is not valid JSON: {reason}")]
    Malformed {
        /// Parser message.
        reason: String,
    },

    /// Top-level value is not an object
    #[error("Response must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was found.
        found: &'static str,
    },

    /// Required field is absent
    #[error("Response is missing required field '{field}'")]
    MissingField {
        /// Path of the missing field.
        field: String,
    },

    /// Field has the wrong primitive type
    #[error("Field '{field}' must be {expected}, got {found}")]
    WrongType {
        /// Path of the offending field.
        field: String,
        /// Expected type description.
        expected: &'static str,
        /// JSON type or value that was found.
        found: String,
    },

    /// Field holds a value outside its enumeration
    #[error("Field '{field}' has unrecognized value '{value}'")]
    UnknownVariant {
        /// Path of the offending field.
        field: String,
        /// The value that was found.
        value: String,
    },

    /// Array has the wrong number of elements
    #[error("Field '{field}' must have exactly {expected} elements, got {found}")]
    WrongLength {
        /// Path of the offending field.
        field: String,
        /// Required element count.
        expected: usize,
        /// Actual element count.
        found: usize,
    },

    /// Reported total disagrees with the sum of its components
    #[error("total_time_sec {reported} does not match component sum {computed}")]
    TotalMismatch {
        /// Total as reported by the service.
        reported: f64,
        /// Sum of the five component metrics.
        computed: f64,
    },
}

/// Main error type for timestudy
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transfer error
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Schema error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Short label for the stage that failed, suitable for user display.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Transfer(_) => "transfer",
            Error::Schema(_) => "response",
            Error::Io(_) => "i/o",
            Error::Other(_) => "internal",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a transfer error
    pub fn is_transfer_error(&self) -> bool {
        matches!(self, Error::Transfer(_))
    }

    /// Check if this is a schema error
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fields_lists_every_field() {
        let err = ValidationError::InvalidFields {
            issues: vec![
                FieldIssue::new("rapid_accel_g", "must be greater than 0"),
                FieldIssue::new("beam_on_code", "must not be empty"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: rapid_accel_g: must be greater than 0; beam_on_code: must not be empty"
        );
        assert_eq!(err.field_names(), vec!["rapid_accel_g", "beam_on_code"]);
    }

    #[test]
    fn test_transfer_classification() {
        let down = TransferError::Connectivity {
            endpoint: "http://localhost:8000/analyze".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(down.is_connectivity());
        assert!(!down.is_rejection());

        let timeout = TransferError::Timeout { timeout_ms: 30000 };
        assert!(timeout.is_connectivity());

        let rejected = TransferError::Rejected {
            status: 422,
            detail: "field required".to_string(),
        };
        assert!(rejected.is_rejection());
        assert!(!rejected.is_connectivity());
        assert_eq!(
            rejected.to_string(),
            "Analysis service rejected the request (HTTP 422): field required"
        );
    }

    #[test]
    fn test_error_stage_labels() {
        let err: Error = ValidationError::MissingFile.into();
        assert_eq!(err.stage(), "validation");
        assert!(err.is_validation_error());

        let err: Error = SchemaError::MissingField {
            field: "total_time_sec".to_string(),
        }
        .into();
        assert_eq!(err.stage(), "response");
        assert_eq!(
            err.to_string(),
            "Response is missing required field 'total_time_sec'"
        );

        let err: Error = TransferError::Timeout { timeout_ms: 10 }.into();
        assert!(err.is_transfer_error());
    }
}
