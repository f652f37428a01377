//! Error types for the runner strategies.

use thiserror::Error;

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors that can occur while executing a batch strategy.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Embedding service error.
    #[error("embedding error: {0}")]
    Embedding(#[from] codesim_embeddings::EmbeddingError),

    /// The requested execution backend is unavailable.
    #[error("backend unavailable: {0}")]
    Backend(String),

    /// Invalid runner configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
