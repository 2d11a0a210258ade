//! # timestudy
//!
//! Client for a CNC laser time-study service. A user edits machine
//! parameters, picks a G-code program, and submits both to a remote analysis
//! service, which answers with a time breakdown and a 2D toolpath.
//!
//! ## Architecture
//!
//! timestudy is organized as a workspace with multiple crates:
//!
//! 1. **timestudy-core** - Error types, modal enums, total-consistency policy
//! 2. **timestudy-settings** - Machine configuration model and client settings
//! 3. **timestudy-communication** - Request building and HTTP transfer
//! 4. **timestudy-visualizer** - Result interpretation and toolpath rendering
//! 5. **timestudy** - Session orchestration and the command-line client

pub mod report;
pub mod session;

pub use session::{Session, SubmitError, SubmitOutcome};

pub use timestudy_communication::{AnalysisClient, ProgramFile, RequestBuilder, TransferPayload};
pub use timestudy_core::{
    format_duration, Error, MismatchSeverity, Positioning, Result, SchemaError, TransferError,
    Units, ValidationError,
};
pub use timestudy_settings::{
    ClientSettings, ConfigField, ConfigurationModel, FieldKind, FieldValue, MachineConfig,
    SettingsError,
};
pub use timestudy_visualizer::{
    render, render_svg, AnalysisResult, DrawInstruction, ResultInterpreter, Segment, SegmentKind,
    ToolpathRenderer, TotalCheck,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so stdout stays clean for reports and `--json`
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
