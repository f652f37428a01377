//! Per-file embedding records and their JSON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// A source file read from the input directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name, unique within one run.
    pub filename: String,

    /// Full file contents.
    pub code: String,
}

impl SourceFile {
    /// Create a new source file record.
    pub fn new(filename: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            code: code.into(),
        }
    }
}

/// One file's embedding as persisted in the embeddings artifact.
///
/// `embedding` is empty when generation failed for this file; the record is
/// still present so every downstream stage sees one entry per input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Source file name.
    pub filename: String,

    /// Full file contents.
    pub code: String,

    /// Embedding vector, or empty on failure.
    pub embedding: Embedding,
}

impl EmbeddingRecord {
    /// Create a record from a file and its embedding.
    pub fn new(filename: impl Into<String>, code: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            filename: filename.into(),
            code: code.into(),
            embedding,
        }
    }

    /// Marker record for a file whose embedding could not be generated.
    pub fn failed(file: SourceFile) -> Self {
        Self {
            filename: file.filename,
            code: file.code,
            embedding: Vec::new(),
        }
    }

    /// Whether this record carries a usable embedding.
    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// Write records as pretty-printed JSON, creating parent directories.
pub async fn save_records(path: impl AsRef<Path>, records: &[EmbeddingRecord]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(records)?;
    fs::write(path, content).await?;

    info!("Saved {} embedding records to {}", records.len(), path.display());
    Ok(())
}

/// Load records written by [`save_records`].
///
/// A missing file is a [`EmbeddingError::StoreMissing`] so callers can abort
/// before issuing any remote calls.
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<EmbeddingRecord>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EmbeddingError::StoreMissing(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await?;
    let records: Vec<EmbeddingRecord> = serde_json::from_str(&content)?;

    debug!("Loaded {} embedding records from {}", records.len(), path.display());
    Ok(records)
}
