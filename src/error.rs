//! Error types for the `minirag` crate.

use thiserror::Error;

/// Errors that can occur in the ingestion and search pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// The caller supplied invalid input (file size, type, or query
    /// parameters). Maps to a 4xx-class response at the transport boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An error occurred while talking to the embedding provider.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the storage backend.
    #[error("Storage error ({backend}): {message}")]
    Storage {
        /// The storage backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector was unusable for similarity computation: zero norm or
    /// dimension mismatch. Never coerced into a score.
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
