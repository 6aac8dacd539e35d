// src/error.rs
// Client error taxonomy with transient-error classification

use thiserror::Error;

/// Errors surfaced by the OmniASR client.
///
/// Nothing here is fatal to the process: every variant returns control to the
/// caller, which may retry or correct its input.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job timed out after {0}s without a terminal status")]
    JobTimedOut(u64),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Transcription cancelled")]
    Cancelled,
}

impl ClientError {
    /// Errors expected to heal on their own: worth retrying without
    /// bothering the caller. Used by the poll loop to pick a log level.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_)
                | ClientError::Timeout
                | ClientError::RateLimited
                | ClientError::Server { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Network("reset".to_string()).is_transient());
        assert!(ClientError::Timeout.is_transient());
        assert!(ClientError::RateLimited.is_transient());
        assert!(ClientError::Server {
            status: 503,
            message: "warming up".to_string()
        }
        .is_transient());

        assert!(!ClientError::Auth.is_transient());
        assert!(!ClientError::JobNotFound("abc".to_string()).is_transient());
        assert!(!ClientError::JobFailed("oom".to_string()).is_transient());
        assert!(!ClientError::Validation("bad file".to_string()).is_transient());
    }
}
