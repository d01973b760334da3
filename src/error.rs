use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Classified failure from a single fetch attempt.
///
/// The fetcher never retries; the scheduler's next tick is the retry.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Failure taxonomy recorded in the history log.
///
/// `Parse` is reserved for documents that cannot be decoded at all;
/// malformed HTML normally degrades to a lossy text extraction instead of
/// failing the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Timeout,
    Unreachable,
    HttpStatus(u16),
    Parse,
    Unexpected,
}

impl From<&FetchError> for FailureKind {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Timeout => FailureKind::Timeout,
            FetchError::Connection(_) => FailureKind::Unreachable,
            FetchError::Status(code) => FailureKind::HttpStatus(*code),
            FetchError::Other(_) => FailureKind::Unexpected,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "network timeout"),
            FailureKind::Unreachable => write!(f, "network unreachable"),
            FailureKind::HttpStatus(code) => write!(f, "HTTP error {}", code),
            FailureKind::Parse => write!(f, "parse error"),
            FailureKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Configuration and wiring errors, surfaced before monitoring starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target URL: '{0}'")]
    InvalidUrl(String),

    #[error("check interval {0}s is outside the accepted range {1}-{2}s")]
    IntervalOutOfRange(u64, u64, u64),

    #[error("history capacity must be greater than zero")]
    ZeroCapacity,

    #[error("invalid volatile pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_map_to_failure_kinds() {
        assert_eq!(FailureKind::from(&FetchError::Timeout), FailureKind::Timeout);
        assert_eq!(
            FailureKind::from(&FetchError::Connection("refused".into())),
            FailureKind::Unreachable
        );
        assert_eq!(
            FailureKind::from(&FetchError::Status(503)),
            FailureKind::HttpStatus(503)
        );
        assert_eq!(
            FailureKind::from(&FetchError::Other("boom".into())),
            FailureKind::Unexpected
        );
    }

    #[test]
    fn failure_kind_display() {
        assert_eq!(FailureKind::HttpStatus(404).to_string(), "HTTP error 404");
        assert_eq!(FailureKind::Timeout.to_string(), "network timeout");
    }
}
