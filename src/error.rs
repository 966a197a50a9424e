//! Error types for the offline worker
//!
//! Strategy handlers never surface these to the page: they are logged and
//! turned into a synthesized 503 response at the strategy boundary. Install
//! swallows them too. They remain useful to callers of the lower layers
//! (cache store, fetcher, configuration).

use thiserror::Error;

/// Main error type for worker operations
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Transport-level failure: offline, DNS, connection reset
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Batch population aborted because one URL did not come back successful
    #[error("Failed to cache {url}: HTTP {status}")]
    AddAllFailed { url: String, status: u16 },

    /// Cache instance lookup by name failed
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    /// URL could not be parsed or resolved against the origin
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Lifecycle transition not allowed from the current state
    #[error("Invalid lifecycle transition: cannot {action} while {state}")]
    InvalidTransition { action: String, state: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for worker operations
pub type Result<T> = std::result::Result<T, WorkerError>;

impl From<String> for WorkerError {
    fn from(s: String) -> Self {
        WorkerError::Other(s)
    }
}

impl From<&str> for WorkerError {
    fn from(s: &str) -> Self {
        WorkerError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(e: serde_json::Error) -> Self {
        WorkerError::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for WorkerError {
    fn from(e: reqwest::Error) -> Self {
        WorkerError::NetworkError(e.to_string())
    }
}
