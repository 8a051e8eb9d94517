/*
[INPUT]:  Error sources (HTTP, API, serialization, auth, execution polling)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
[UPDATE]: 2026-09-24 Split execution failure and poll timeout into distinct variants
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the searchwatch adapter
#[derive(Error, Debug)]
pub enum SearchwatchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Authentication failed or credentials were rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Connection timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },

    /// The watched execution finished with status `failed`
    #[error("{message}")]
    ExecutionFailed {
        execution_id: String,
        message: String,
    },

    /// The watched execution never reached a terminal status
    #[error("Execution timed out")]
    ExecutionTimedOut { execution_id: String, attempts: u32 },
}

impl SearchwatchError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchwatchError::Http(err) => !err.is_decode() && !err.is_builder(),
            SearchwatchError::Api { code, .. } => *code >= 500,
            SearchwatchError::RateLimit { .. }
            | SearchwatchError::Timeout { .. }
            | SearchwatchError::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            SearchwatchError::RateLimit { retry_after } => Some(*retry_after),
            SearchwatchError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SearchwatchError::Authentication { .. })
    }

    /// The execution ran and reported `failed`.
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, SearchwatchError::ExecutionFailed { .. })
    }

    /// Polling gave up before the execution reached a terminal status.
    pub fn is_poll_timeout(&self) -> bool {
        matches!(self, SearchwatchError::ExecutionTimedOut { .. })
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        SearchwatchError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchwatchError::Api { code: 404, .. })
    }
}

/// Result type alias for searchwatch operations
pub type Result<T> = std::result::Result<T, SearchwatchError>;
