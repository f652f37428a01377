//! Partitioned lazy batch execution.
//!
//! A small dataframe-shaped layer: input files are split into partitions, an
//! embedding transform is declared up front, and nothing runs until
//! [`FrameEmbedder::collect`] materializes every partition at once.

use tokio::task::JoinSet;
use tracing::debug;

use codesim_embeddings::{EmbeddingClient, EmbeddingRecord, SourceFile};

use crate::error::{Result, RunnerError};
use crate::threaded::embed_one;

/// Where partitioned work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBackend {
    /// In-process scheduling; one partition per available core.
    Local,

    /// Distributed workers; partition count follows the worker count.
    Distributed {
        /// Number of remote workers.
        workers: usize,
    },
}

impl FrameBackend {
    /// Resolve a distributed backend from an explicit worker count.
    ///
    /// The backend is unavailable without one; that error is what sends the
    /// caller down the threaded fallback path.
    pub fn distributed(workers: Option<usize>) -> Result<Self> {
        match workers {
            None => Err(RunnerError::Backend(
                "no distributed workers configured".to_string(),
            )),
            Some(0) => Err(RunnerError::Backend(
                "distributed worker count must be nonzero".to_string(),
            )),
            Some(workers) => Ok(Self::Distributed { workers }),
        }
    }

    /// Partition count for this backend.
    pub fn partitions(&self) -> usize {
        match self {
            Self::Local => std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(2),
            Self::Distributed { workers } => *workers,
        }
    }
}

/// How the embedding column is computed within each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedTransform {
    /// One batched request per partition.
    Batched,

    /// A per-row UDF applied by the partition scheduler.
    RowUdf,
}

/// A lazily evaluated, partitioned view over the input files.
///
/// Construction declares the transform without issuing any remote call;
/// [`collect`](Self::collect) is the only side-effecting operation.
#[derive(Debug, Clone)]
pub struct FrameEmbedder {
    /// Embedding service client.
    client: EmbeddingClient,

    /// Scheduling backend.
    backend: FrameBackend,

    /// Declared embedding transform.
    transform: EmbedTransform,
}

impl FrameEmbedder {
    /// Declare an embedding transform over a partitioned frame.
    pub fn new(client: EmbeddingClient, backend: FrameBackend, transform: EmbedTransform) -> Self {
        Self {
            client,
            backend,
            transform,
        }
    }

    /// Materialize embeddings for every file.
    ///
    /// A batched partition that fails is a strategy-level error: the whole
    /// batch is reported failed so the caller can re-execute it elsewhere
    /// instead of accepting a partial result.
    pub async fn collect(&self, files: Vec<SourceFile>) -> Result<Vec<EmbeddingRecord>> {
        let partitions = partition(files, self.backend.partitions());
        debug!(
            "Materializing {} partitions on {:?}",
            partitions.len(),
            self.backend
        );

        let mut tasks = JoinSet::new();
        for part in partitions {
            let client = self.client.clone();
            let transform = self.transform;
            tasks.spawn(async move { evaluate_partition(&client, transform, part).await });
        }

        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let part =
                joined.map_err(|e| RunnerError::Backend(format!("partition task failed: {e}")))??;
            records.extend(part);
        }

        Ok(records)
    }
}

/// Split files into at most `count` contiguous partitions.
fn partition(files: Vec<SourceFile>, count: usize) -> Vec<Vec<SourceFile>> {
    if files.is_empty() {
        return Vec::new();
    }

    let chunk = files.len().div_ceil(count.max(1));
    files
        .chunks(chunk)
        .map(<[SourceFile]>::to_vec)
        .collect()
}

/// Evaluate the declared transform over one partition.
async fn evaluate_partition(
    client: &EmbeddingClient,
    transform: EmbedTransform,
    files: Vec<SourceFile>,
) -> Result<Vec<EmbeddingRecord>> {
    match transform {
        EmbedTransform::Batched => {
            let codes: Vec<String> = files.iter().map(|f| f.code.clone()).collect();
            let embeddings = client.embed_batch(&codes).await?;
            Ok(files
                .into_iter()
                .zip(embeddings)
                .map(|(file, embedding)| EmbeddingRecord::new(file.filename, file.code, embedding))
                .collect())
        }
        EmbedTransform::RowUdf => {
            // Row failures stay isolated inside the partition; only the
            // scheduler itself can fail the strategy.
            let mut records = Vec::with_capacity(files.len());
            for file in files {
                records.push(embed_one(client, file).await);
            }
            Ok(records)
        }
    }
}
