//! Enhanced analysis over stored embeddings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use codesim_embeddings::chat::ChatClient;
use codesim_embeddings::{SimilarityMatch, find_similar_pairs, load_records};
use codesim_runner::FrameBackend;

use crate::error::Result;
use crate::report::{AnalysisReport, CodeAnalyzer};

/// Default similarity threshold for reported pairs.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Execution mode for the enhanced analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeRunner {
    /// In-process execution.
    Local,

    /// Distributed frame backend, when available.
    Ray,
}

impl fmt::Display for AnalyzeRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Ray => "ray",
        };
        write!(f, "{name}")
    }
}

/// A similar pair as persisted in the enhanced artifact, without the code
/// bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    /// First file of the pair.
    pub file1: String,

    /// Second file of the pair.
    pub file2: String,

    /// Cosine similarity of the two embeddings.
    pub similarity: f64,
}

impl From<&SimilarityMatch> for SimilarPair {
    fn from(m: &SimilarityMatch) -> Self {
        Self {
            file1: m.file1.clone(),
            file2: m.file2.clone(),
            similarity: m.similarity,
        }
    }
}

/// The enhanced-analysis artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAnalysis {
    /// Runner the caller requested.
    pub runner: String,

    /// Pairs above the similarity threshold, best first.
    pub similar_pairs: Vec<SimilarPair>,

    /// One report per file, keyed by filename.
    pub analyses: BTreeMap<String, AnalysisReport>,
}

/// Orchestrates similarity plus per-file reports over a stored embedding set.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    /// Report generator.
    analyzer: CodeAnalyzer,

    /// Requested execution mode.
    runner: AnalyzeRunner,

    /// Similarity threshold for reported pairs.
    threshold: f64,

    /// Worker count for the distributed backend, if configured.
    distributed_workers: Option<usize>,
}

impl AnalysisEngine {
    /// Create an engine for the requested runner.
    pub fn new(chat: ChatClient, runner: AnalyzeRunner) -> Self {
        Self {
            analyzer: CodeAnalyzer::new(chat),
            runner,
            threshold: SIMILARITY_THRESHOLD,
            distributed_workers: None,
        }
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Configure the distributed worker count.
    pub fn with_distributed_workers(mut self, workers: usize) -> Self {
        self.distributed_workers = Some(workers);
        self
    }

    /// Run the full enhanced analysis over the records at `embeddings_path`.
    ///
    /// A missing embeddings artifact aborts before any remote call. Per-file
    /// report failures degrade to raw fallbacks and never stop the batch.
    pub async fn run(&self, embeddings_path: impl AsRef<Path>) -> Result<EnhancedAnalysis> {
        let records = load_records(embeddings_path).await?;
        info!("Loaded {} embedding records", records.len());

        self.check_backend();

        let similar_pairs: Vec<SimilarPair> = find_similar_pairs(&records, self.threshold)?
            .iter()
            .map(SimilarPair::from)
            .collect();
        info!("Found {} similar code pairs", similar_pairs.len());

        let mut analyses = BTreeMap::new();
        for record in &records {
            info!("Analyzing: {}", record.filename);
            let report = self.analyzer.analyze(&record.code).await;
            analyses.insert(record.filename.clone(), report);
        }

        // The artifact records the requested runner; a backend fallback is
        // logged but does not rename the run.
        Ok(EnhancedAnalysis {
            runner: self.runner.to_string(),
            similar_pairs,
            analyses,
        })
    }

    /// Probe the requested backend, dropping to local work when unavailable.
    fn check_backend(&self) {
        if self.runner == AnalyzeRunner::Ray {
            match FrameBackend::distributed(self.distributed_workers) {
                Ok(backend) => info!("Using distributed backend: {backend:?}"),
                Err(e) => warn!("Failed to initialize distributed backend: {e}; falling back to local execution"),
            }
        }
    }
}
