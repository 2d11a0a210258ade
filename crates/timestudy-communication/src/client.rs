//! HTTP transfer to the analysis service
//!
//! One submission is one POST. There is no retry and no backoff here: a
//! failure is classified once and handed back to the caller, which decides
//! whether and how to try again.

use std::time::Duration;

use timestudy_core::TransferError;
use url::Url;

use crate::request::TransferPayload;

/// Longest rejection detail kept from a response body, in characters.
const MAX_DETAIL_CHARS: usize = 300;

/// Client for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl AnalysisClient {
    /// Create a client whose requests settle within `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a payload and return the raw response body
    ///
    /// Only 2xx responses yield a body; everything else is a [`TransferError`].
    pub async fn submit(&self, payload: TransferPayload) -> Result<Vec<u8>, TransferError> {
        let parts = payload.len();
        let size = payload.body_size();
        let (endpoint, form) = payload.into_form();

        tracing::info!(
            "Submitting {} parts ({} bytes) to {}",
            parts,
            size,
            endpoint
        );

        let response = self
            .http
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(&endpoint, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify_body(e))?;

        if !status.is_success() {
            let detail = rejection_detail(&body);
            tracing::warn!("Analysis service returned {}: {}", status, detail);
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::info!("Received {} byte response ({})", body.len(), status);
        Ok(body.to_vec())
    }

    /// Probe the service root (`GET /`) and return its status message
    pub async fn health(&self, endpoint: &Url) -> Result<String, TransferError> {
        let root = endpoint
            .join("/")
            .map_err(|e| TransferError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Probing analysis service at {}", root);

        let response = self
            .http
            .get(root.clone())
            .send()
            .await
            .map_err(|e| self.classify(&root, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify_body(e))?;

        if !status.is_success() {
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                detail: rejection_detail(&body),
            });
        }

        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| truncate(&String::from_utf8_lossy(&body)));

        Ok(message)
    }

    fn classify(&self, endpoint: &Url, err: reqwest::Error) -> TransferError {
        if err.is_timeout() {
            TransferError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            TransferError::Connectivity {
                endpoint: endpoint.to_string(),
                reason: error_chain(&err),
            }
        }
    }

    fn classify_body(&self, err: reqwest::Error) -> TransferError {
        if err.is_timeout() {
            TransferError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            TransferError::Body {
                reason: error_chain(&err),
            }
        }
    }
}

/// reqwest's top-level message is generic; the useful part is in the sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Extract a readable reason from an error response body
///
/// FastAPI-style services put the reason under `detail`, either as a string or
/// as a list of validation issues.
pub fn rejection_detail(body: &[u8]) -> String {
    if body.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return truncate(detail),
            Some(other) => return truncate(&other.to_string()),
            None => {}
        }
    }

    truncate(String::from_utf8_lossy(body).trim())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_CHARS {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX_DETAIL_CHARS).collect();
        short.push('…');
        short
    }
}
