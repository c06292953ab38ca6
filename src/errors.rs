//! Error types for the advisory client
//!
//! Every fallible library operation returns [`Result`]; the binary wraps
//! these in `anyhow` for top-level context.

use thiserror::Error;

/// Main error type for the advisory client
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Request could not be sent, or the connection dropped mid-stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Advisory API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// A streamed record could not be interpreted
    #[error("Malformed stream record: {0}")]
    MalformedRecord(String),

    /// Question was blank after trimming
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdvisorError {
    /// Errors that end a request in the failed state
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdvisorError::Transport(_) | AdvisorError::Api { .. } | AdvisorError::Http(_)
        )
    }
}

/// Result type alias for advisory client operations
pub type Result<T> = std::result::Result<T, AdvisorError>;
