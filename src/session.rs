//! Analysis session
//!
//! A session owns the one editable machine configuration and the most recent
//! analysis result. Submission runs build, transfer, interpret and the total
//! check in order. A new result replaces the previous one only when every
//! stage succeeds.

use std::time::Duration;

use thiserror::Error;
use timestudy_communication::{AnalysisClient, ProgramFile, RequestBuilder};
use timestudy_core::{SchemaError, TransferError, ValidationError};
use timestudy_settings::{ClientSettings, ConfigurationModel};
use timestudy_visualizer::{
    AnalysisResult, DrawInstruction, ResultInterpreter, ToolpathRenderer, TotalCheck,
};
use url::Url;

/// A failed submission, tagged with the stage that failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Local input was rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The exchange with the analysis service failed
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// The service answered with a body that breaks the result contract
    #[error("Unusable analysis response: {0}")]
    Schema(#[from] SchemaError),
}

impl SubmitError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transfer(_) => "transfer",
            Self::Schema(_) => "response",
        }
    }
}

impl From<SubmitError> for timestudy_core::Error {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => e.into(),
            SubmitError::Transfer(e) => e.into(),
            SubmitError::Schema(e) => e.into(),
        }
    }
}

/// A successful submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmitOutcome<'a> {
    /// The session's new latest result
    pub result: &'a AnalysisResult,
    /// Reported total compared with the component sum
    pub total: TotalCheck,
}

/// One user's configuration and latest result
#[derive(Debug)]
pub struct Session {
    config: ConfigurationModel,
    last_result: Option<AnalysisResult>,
    builder: RequestBuilder,
    client: AnalysisClient,
    interpreter: ResultInterpreter,
}

impl Session {
    pub fn new(
        builder: RequestBuilder,
        client: AnalysisClient,
        interpreter: ResultInterpreter,
    ) -> Self {
        Self {
            config: ConfigurationModel::new(),
            last_result: None,
            builder,
            client,
            interpreter,
        }
    }

    /// Create a session for an already resolved endpoint
    pub fn from_settings(settings: &ClientSettings, endpoint: &str) -> Result<Self, TransferError> {
        let builder = RequestBuilder::new(endpoint)?;
        let client = AnalysisClient::new(Duration::from_millis(settings.timeout_ms))?;
        let interpreter =
            ResultInterpreter::new(settings.total_tolerance_sec, settings.mismatch_severity);

        tracing::debug!(
            "Session targets {} (timeout {}ms)",
            builder.endpoint(),
            settings.timeout_ms
        );

        Ok(Self::new(builder, client, interpreter))
    }

    pub fn config(&self) -> &ConfigurationModel {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigurationModel {
        &mut self.config
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    pub fn endpoint(&self) -> &Url {
        self.builder.endpoint()
    }

    /// Submit a program with the current configuration
    ///
    /// Taking `&mut self` keeps a second submission from starting while one is
    /// in flight. On any failure the previous result is kept.
    pub async fn submit(
        &mut self,
        file: Option<&ProgramFile>,
    ) -> Result<SubmitOutcome<'_>, SubmitError> {
        let payload = self.builder.build(file, &self.config)?;
        let body = self.client.submit(payload).await?;
        let result = self.interpreter.interpret(&body)?;
        let total = result.check_total(self.interpreter.tolerance());

        tracing::info!(
            "Analysis of {} complete: total {}s over {} segments",
            result.filename,
            result.total_time_sec,
            result.toolpath.len()
        );

        let result = self.last_result.insert(result);
        Ok(SubmitOutcome { result, total })
    }

    /// Check that the analysis service is up
    pub async fn health(&self) -> Result<String, TransferError> {
        self.client.health(self.builder.endpoint()).await
    }

    /// Draw the latest toolpath, if there is one
    pub fn preview(&self, renderer: &ToolpathRenderer) -> Option<Vec<DrawInstruction>> {
        self.last_result
            .as_ref()
            .map(|result| renderer.render(&result.toolpath))
    }
}
