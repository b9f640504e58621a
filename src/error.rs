// src/error.rs
//! Application error types with structured error handling.
//!
//! Each variant names what went wrong and where. Rate limiting and missing
//! resources are not errors at this level: the client recovers from the
//! former and reports the latter as an absent value. What reaches callers
//! here is fatal for the post being archived.

use std::fmt;
use thiserror::Error;

/// How the upstream API answered a request, as a typed vocabulary.
///
/// The retry loop branches on this rather than on raw status numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    /// 2xx/3xx — the body is usable
    Success,
    /// 429 — back off and retry
    RateLimited,
    /// 404 — the resource is absent (deleted, or hidden by privacy)
    NotFound,
    /// Any other status at or above 400
    Fault(u16),
}

impl UpstreamStatus {
    /// Classifies an HTTP (or envelope `meta.status`) code.
    pub fn from_code(code: u16) -> Self {
        match code {
            429 => Self::RateLimited,
            404 => Self::NotFound,
            c if c >= 400 => Self::Fault(c),
            _ => Self::Success,
        }
    }

    /// Whether the request is worth repeating after a pause.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::RateLimited => write!(f, "429 Too Many Requests"),
            Self::NotFound => write!(f, "404 Not Found"),
            Self::Fault(code) => write!(f, "http_{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// A non-retryable error status from the API. `message` joins the
    /// envelope message with every reported error detail.
    #[error("{status} {message}")]
    Upstream { status: u16, message: String },

    #[error("Still rate limited after {attempts} attempts at {uri}")]
    RateLimitExhausted { attempts: u32, uri: String },

    #[error("Malformed link: {0}")]
    MalformedLink(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert_eq!(UpstreamStatus::from_code(200), UpstreamStatus::Success);
        assert_eq!(UpstreamStatus::from_code(301), UpstreamStatus::Success);
        assert_eq!(UpstreamStatus::from_code(429), UpstreamStatus::RateLimited);
        assert_eq!(UpstreamStatus::from_code(404), UpstreamStatus::NotFound);
        assert_eq!(UpstreamStatus::from_code(401), UpstreamStatus::Fault(401));
        assert_eq!(UpstreamStatus::from_code(503), UpstreamStatus::Fault(503));
        assert!(UpstreamStatus::RateLimited.is_retryable());
        assert!(!UpstreamStatus::Fault(500).is_retryable());
    }

    #[test]
    fn upstream_error_message_carries_status() {
        let err = AppError::Upstream {
            status: 401,
            message: "Unauthorized: No user was found; Check your key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "401 Unauthorized: No user was found; Check your key"
        );
    }
}
