//! # timestudy Core
//!
//! Core types shared by every timestudy crate: the error taxonomy for the three
//! submission stages, the modal-state enumerations reported by the analysis
//! service, and display helpers.

pub mod consistency;
pub mod error;
pub mod units;

pub use consistency::{MismatchSeverity, DEFAULT_TOTAL_TOLERANCE_SEC};
pub use error::{Error, FieldIssue, Result, SchemaError, TransferError, ValidationError};
pub use units::{format_duration, Positioning, Units};
