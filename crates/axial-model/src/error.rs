//! Model client error types.

use thiserror::Error;

/// Errors that can occur when calling the generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request.
    #[error("API error {status} {code}: {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Canonical Google status (`INVALID_ARGUMENT`, `PERMISSION_DENIED`, ...).
        code: String,
        /// `error.message` from the envelope, or the raw body.
        message: String,
    },

    /// Quota exhausted (429) or model overloaded (503).
    #[error("model unavailable ({status}): {message}")]
    Unavailable {
        /// HTTP status code returned by the API.
        status: u16,
        message: String,
        /// Server-suggested wait, from `Retry-After` or `RetryInfo.retryDelay`.
        retry_after_secs: Option<u64>,
    },

    /// The response carried no candidate text.
    #[error("empty response (finish reason: {finish_reason})")]
    EmptyResponse {
        /// Finish or block reason reported by the API, if any.
        finish_reason: String,
    },

    /// Failed to parse the response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// The client could not be built from configuration.
    #[error("client configuration error: {0}")]
    Config(#[from] axial_config::ConfigError),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::EmptyResponse { .. } | Self::Parse(_) | Self::Config(_) => false,
        }
    }
}
