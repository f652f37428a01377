//! Threaded batch embedding.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use codesim_embeddings::{EmbeddingClient, EmbeddingRecord, SourceFile};

/// Upper bound on concurrent embedding requests.
const MAX_WORKERS: usize = 32;

/// Worker-pool size: `min(32, 5 × available parallelism)`.
fn worker_count() -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    MAX_WORKERS.min(parallelism * 5)
}

/// Embeds files with a bounded pool of concurrent requests.
///
/// Records are gathered in completion order, not input order; consumers must
/// index by filename. Each request is fault-isolated: one failed file yields
/// an empty-vector record while every other file proceeds.
#[derive(Debug, Clone)]
pub struct ThreadedEmbedder {
    /// Embedding service client.
    client: EmbeddingClient,

    /// Maximum number of in-flight requests.
    max_workers: usize,
}

impl ThreadedEmbedder {
    /// Create an embedder with the default worker-pool size.
    pub fn new(client: EmbeddingClient) -> Self {
        Self {
            client,
            max_workers: worker_count(),
        }
    }

    /// Override the worker-pool size.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Embed every file; exactly one record per input.
    pub async fn embed_files(&self, files: Vec<SourceFile>) -> Vec<EmbeddingRecord> {
        debug!(
            "Embedding {} files with up to {} workers",
            files.len(),
            self.max_workers
        );

        stream::iter(files)
            .map(|file| {
                let client = self.client.clone();
                async move { embed_one(&client, file).await }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await
    }
}

/// Embed a single file, recording failure as an empty vector.
pub(crate) async fn embed_one(client: &EmbeddingClient, file: SourceFile) -> EmbeddingRecord {
    match client.embed(&file.code).await {
        Ok(embedding) => {
            debug!("Generated embedding for {}", file.filename);
            EmbeddingRecord::new(file.filename, file.code, embedding)
        }
        Err(e) => {
            warn!("Error processing {}: {e}", file.filename);
            EmbeddingRecord::failed(file)
        }
    }
}
