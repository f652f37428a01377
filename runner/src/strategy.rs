//! Strategy selection and fallback orchestration.

use std::fmt;

use async_trait::async_trait;
use tracing::{info, warn};

use codesim_embeddings::{EmbeddingClient, EmbeddingRecord, SourceFile};

use crate::error::{Result, RunnerError};
use crate::frame::{EmbedTransform, FrameBackend, FrameEmbedder};
use crate::threaded::ThreadedEmbedder;

/// Which execution strategy maps files to embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerKind {
    /// Bounded worker pool of concurrent single-file requests.
    Threads,

    /// Distributed partitioned frame with batched column transforms.
    Ray,

    /// Locally partitioned frame with a per-row embedding UDF.
    Daft,
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Threads => "threads",
            Self::Ray => "ray",
            Self::Daft => "daft",
        };
        write!(f, "{name}")
    }
}

/// A batch embedder maps every submitted file to exactly one record.
#[async_trait]
pub trait BatchEmbedder: Send + Sync {
    /// Embed all files; one record per file, ordering unspecified.
    async fn run(&self, files: Vec<SourceFile>) -> Result<Vec<EmbeddingRecord>>;
}

#[async_trait]
impl BatchEmbedder for ThreadedEmbedder {
    async fn run(&self, files: Vec<SourceFile>) -> Result<Vec<EmbeddingRecord>> {
        Ok(self.embed_files(files).await)
    }
}

#[async_trait]
impl BatchEmbedder for FrameEmbedder {
    async fn run(&self, files: Vec<SourceFile>) -> Result<Vec<EmbeddingRecord>> {
        self.collect(files).await
    }
}

/// Runs the selected strategy, falling back to the threaded pool.
///
/// Frame strategies that fail at the strategy level are re-executed in full
/// under [`ThreadedEmbedder`], so the returned batch is never partial: each
/// input file comes back with either a real embedding or an empty marker.
#[derive(Debug, Clone)]
pub struct EmbedRunner {
    /// Selected strategy.
    kind: RunnerKind,

    /// Embedding service client.
    client: EmbeddingClient,

    /// Worker count for the distributed backend, if configured.
    distributed_workers: Option<usize>,
}

impl EmbedRunner {
    /// Create a runner for the selected strategy.
    pub fn new(kind: RunnerKind, client: EmbeddingClient) -> Self {
        Self {
            kind,
            client,
            distributed_workers: None,
        }
    }

    /// Configure the distributed worker count.
    pub fn with_distributed_workers(mut self, workers: usize) -> Self {
        self.distributed_workers = Some(workers);
        self
    }

    /// Embed every file under the selected strategy.
    pub async fn run(&self, files: Vec<SourceFile>) -> Vec<EmbeddingRecord> {
        info!("Generating embeddings using runner='{}'", self.kind);

        match self.kind {
            RunnerKind::Threads => {
                ThreadedEmbedder::new(self.client.clone())
                    .embed_files(files)
                    .await
            }
            RunnerKind::Ray => match self.run_distributed(files.clone()).await {
                Ok(records) => records,
                Err(e) => self.fall_back(files, &e).await,
            },
            RunnerKind::Daft => {
                let embedder = FrameEmbedder::new(
                    self.client.clone(),
                    FrameBackend::Local,
                    EmbedTransform::RowUdf,
                );
                match embedder.collect(files.clone()).await {
                    Ok(records) => records,
                    Err(e) => self.fall_back(files, &e).await,
                }
            }
        }
    }

    async fn run_distributed(&self, files: Vec<SourceFile>) -> Result<Vec<EmbeddingRecord>> {
        let backend = FrameBackend::distributed(self.distributed_workers)?;
        FrameEmbedder::new(self.client.clone(), backend, EmbedTransform::Batched)
            .collect(files)
            .await
    }

    /// Re-execute the whole batch under the threaded pool.
    async fn fall_back(&self, files: Vec<SourceFile>, error: &RunnerError) -> Vec<EmbeddingRecord> {
        warn!(
            "{} runner failed ({error}); falling back to threaded mode",
            self.kind
        );
        ThreadedEmbedder::new(self.client.clone())
            .embed_files(files)
            .await
    }
}
