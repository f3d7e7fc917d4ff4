use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::log_redaction::redact_secrets;

/// How much of the raw model output is echoed back on a parse failure.
pub const RAW_EXCERPT_CHARS: usize = 500;

/// Request-level failures of the trip planning pipeline. Only these abort a request.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("model response did not contain a JSON object")]
    MalformedResponse { raw: String },

    #[error("model response JSON could not be parsed: {source}")]
    JsonDecode {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("text generation failed: {0}")]
    Generation(#[from] ServiceError),

    #[error("invalid trip request: {0}")]
    InvalidRequest(String),
}

impl PlanError {
    /// First characters of the raw model text, for debugging parse failures.
    pub fn raw_excerpt(&self) -> Option<String> {
        match self {
            PlanError::MalformedResponse { raw } | PlanError::JsonDecode { raw, .. } => {
                Some(raw.chars().take(RAW_EXCERPT_CHARS).collect())
            }
            _ => None,
        }
    }
}

impl ResponseError for PlanError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlanError::MalformedResponse { .. } | PlanError::JsonDecode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PlanError::Generation(_) => StatusCode::BAD_GATEWAY,
            PlanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PlanError::MalformedResponse { .. } => json!({
                "error": "AI response did not contain valid JSON",
                "raw": self.raw_excerpt(),
            }),
            PlanError::JsonDecode { source, .. } => json!({
                "error": "Failed to parse JSON from AI response",
                "details": source.to_string(),
                "raw": self.raw_excerpt(),
            }),
            PlanError::Generation(err) => json!({
                "error": "Trip generation failed",
                "details": redact_secrets(&err.to_string()),
            }),
            PlanError::InvalidRequest(msg) => json!({ "error": msg }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Failures talking to an external provider. Callers in the enrichment path convert
/// these into default values; they never reach the HTTP layer except via `Generation`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider error: {0}")]
    Api(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ServiceError::Timeout;
        }
        // reqwest errors carry the request URL, which carries the API key.
        ServiceError::Http(err.without_url())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
}
