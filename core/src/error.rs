//! Structured error types for floorsign
//!
//! One error enum for the whole crate, with a retryability classifier
//! that drives the login retry policy: connection-level failures are
//! transient, vendor rejections are terminal.

use thiserror::Error;

/// Primary error type for floorsign operations
#[derive(Error, Debug)]
pub enum FloorsignError {
    /// Connection-level failure: refused, reset, DNS, or a request timeout.
    /// The vendor API is flaky enough that these are worth retrying.
    #[error("network error: {message}")]
    Network { message: String },

    /// The vendor answered with a well-formed body whose `status` is not 1.
    /// Retrying the same request will produce the same answer.
    #[error("api rejected request (status {status}): {message}")]
    Api { status: i64, message: String },

    /// Every login protocol has been exhausted. The single fatal condition.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// Session cache file problems. Callers recover by treating the cache
    /// as empty, so this mostly shows up in logs.
    #[error("session cache error: {0}")]
    Cache(String),

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FloorsignError {
    /// Check if the error is transient and worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,

            Self::Api { .. }
            | Self::Auth { .. }
            | Self::Cache(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_) => false,
        }
    }
}

/// All reqwest failures (connect, timeout, HTTP error statuses surfaced via
/// `error_for_status`, body decode) count as network-level for retry
/// purposes, matching how the upstream API behaves when it is overloaded.
impl From<reqwest::Error> for FloorsignError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type alias using FloorsignError
pub type Result<T> = std::result::Result<T, FloorsignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(FloorsignError::Network {
            message: "connection reset".to_string()
        }
        .is_retryable());

        assert!(!FloorsignError::Api {
            status: 0,
            message: "wrong password".to_string()
        }
        .is_retryable());

        assert!(!FloorsignError::Auth {
            reason: "both protocols failed".to_string()
        }
        .is_retryable());

        assert!(!FloorsignError::Cache("corrupt file".to_string()).is_retryable());
    }

    #[test]
    fn test_display_includes_status() {
        let err = FloorsignError::Api {
            status: 0,
            message: "QQ bound".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("status 0"));
        assert!(text.contains("QQ bound"));
    }
}
