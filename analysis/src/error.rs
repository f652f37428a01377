//! Error types for the analysis engine.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during enhanced analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Embedding store or similarity error.
    #[error("embedding error: {0}")]
    Embedding(#[from] codesim_embeddings::EmbeddingError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
