//! Larder error types

use std::time::Duration;

use crate::config::ApiSource;

/// Larder error types
#[derive(Debug, thiserror::Error)]
pub enum LarderError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed ({status})")]
    AuthenticationFailed { status: u16 },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not parse provider output: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Soft errors
    #[error("empty response from provider")]
    EmptyResponse,

    #[error("no recipes found")]
    NoResults,

    #[error("result rejected by validator: {0}")]
    ValidationRejected(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No client is registered for the configured recipe source.
    /// The orchestrator treats this like an upstream failure and may fall back.
    #[error("no client registered for recipe source '{0}'")]
    SourceNotRegistered(ApiSource),
}

impl LarderError {
    /// Whether a recipe-source failure allows the orchestrator to try the AI
    /// generator instead.
    ///
    /// Everything a recipe source can fail with is recoverable by falling
    /// back, except caller mistakes (`InvalidInput`), which would fail the
    /// same way against any source.
    pub fn is_fallback_trigger(&self) -> bool {
        !matches!(self, LarderError::InvalidInput(_))
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LarderError::Api { status, .. } => Some(*status),
            LarderError::RateLimited { .. } => Some(429),
            LarderError::AuthenticationFailed { status } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Larder operations
pub type Result<T> = std::result::Result<T, LarderError>;
