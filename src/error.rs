//! Error types for the memoizing fetcher
//!
//! The cache itself never fails; these errors belong to the HTTP calls made
//! around it. Failed requests are never cached.

use thiserror::Error;

// == Fetch Error Enum ==
/// Unified error type for cached HTTP fetches.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, timeout, or client construction failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL or path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A newer request superseded this one, or it was cancelled explicitly
    #[error("Request cancelled")]
    Cancelled,

    /// The request task panicked
    #[error("Request task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Whether this error is the result of cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

// == Result Type Alias ==
/// Convenience Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FetchError::Status {
            status: 404,
            url: "http://localhost:3001/posts/9".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 404 from http://localhost:3001/posts/9");
        assert_eq!(FetchError::Cancelled.to_string(), "Request cancelled");
        assert!(FetchError::InvalidUrl("::".to_string()).to_string().contains("::"));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Task("boom".to_string()).is_cancelled());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: FetchError = parse_err.into();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
