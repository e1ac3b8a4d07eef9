//! Error types for the Close CRM extractor

use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unrecognized date/time value {0}")]
    UnrecognizedDate(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error on {url}; received status {status}: {body}")]
    Client { url: String, status: u16, body: String },

    #[error("Error on {url}; received status {status}: {body}")]
    Server { url: String, status: u16, body: String },

    #[error("Rate limited on {url} - gave up after {waits} waits")]
    RateLimited { url: String, waits: u32 },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl ApiError {
    /// Transport failures and 5xx responses are worth another attempt;
    /// client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(e) => !e.status().is_some_and(|s| s.is_client_error()),
            ApiError::Server { .. } => true,
            ApiError::Client { .. }
            | ApiError::RateLimited { .. }
            | ApiError::InvalidResponse { .. } => false,
        }
    }

    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::InvalidResponse { .. } => None,
        }
    }
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for ApiError
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = ApiError::Client {
            url: "https://example.com/lead/".into(),
            status: 404,
            body: "not found".into(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = ApiError::Server {
            url: "https://example.com/lead/".into(),
            status: 502,
            body: String::new(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_fatal_message_carries_url_status_and_body() {
        let err = ApiError::Client {
            url: "https://example.com/lead/".into(),
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error on https://example.com/lead/; received status 401: bad key"
        );
    }
}
