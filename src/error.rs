//! Error taxonomy for the network-access layer.
//!
//! Every path out of the request executor terminates in one of these
//! variants; raw backend envelope shapes never escape past the normalizer.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure classification for a normalized API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained (DNS failure, connection refused, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend rejected the credential (HTTP 401 or equivalent).
    ///
    /// Intercepted centrally by the session controller; ordinary call
    /// sites see it only as the final returned error after the session
    /// has already been demoted.
    #[error("Session expired")]
    AuthExpired,

    /// Well-formed response signaling a domain-level rejection.
    #[error("Business error {code}: {message}")]
    Business { code: i64, message: String },

    /// Malformed body where a structured body was expected.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Durable credential storage failed (read or write).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// True for errors the caller may reasonably retry as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
