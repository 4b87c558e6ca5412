//! Error types for CFP

use thiserror::Error;

/// Result type alias for CFP operations
pub type Result<T> = std::result::Result<T, CfpError>;

/// Main error type for CFP.
///
/// Variants map to the pipeline's propagation policy: only
/// transport-class failures (`Transport`) are fatal to a batch
/// operation; classification, line-decode, model, and per-document
/// store errors are recovered locally and surface only in logs and
/// counters.
#[derive(Error, Debug)]
pub enum CfpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Malformed line: {0}")]
    LineDecode(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CfpError {
    /// Create a transport error with context
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a classification error with context
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    /// Create a document store error with context
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
