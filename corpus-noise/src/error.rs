/// Error types for the preprocessing pipeline
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    /// Operator or pipeline configuration rejected at construction time
    #[error("Configuration error: {0}")]
    Config(String),
    /// An `op` name that no registered operator answers to
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    /// Failure reading a resource file referenced by the configuration
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed word embedding file
    #[error("Embedding error: {0}")]
    Embedding(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for preprocessing operations
pub type PrepResult<T> = Result<T, PrepError>;

impl PrepError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PrepError::Config(msg.into())
    }
}
