//! # timestudy Communication
//!
//! Builds multipart submissions from a program file and the machine
//! configuration, and transfers them to the analysis service over HTTP.

pub mod client;
pub mod request;

pub use client::{rejection_detail, AnalysisClient};
pub use request::{
    encode_code, encode_flag, encode_number, Part, PartBody, ProgramFile, RequestBuilder,
    TransferPayload, FILE_PART,
};
