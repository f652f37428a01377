//! Pairwise similarity over embedding records.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::store::EmbeddingRecord;

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite direction
///
/// If either vector has zero norm the similarity is exactly 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

/// A pair of files whose embeddings score above the similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// First file of the pair.
    pub file1: String,

    /// Second file of the pair.
    pub file2: String,

    /// Cosine similarity of the two embeddings.
    pub similarity: f64,

    /// First file's code.
    pub code1: String,

    /// Second file's code.
    pub code2: String,
}

/// Find all record pairs scoring strictly above `threshold`.
///
/// Records with an empty embedding (failed generation) are skipped. Every
/// surviving pair is compared exactly, O(N²); results are sorted descending
/// by similarity, with ties keeping the original pair order.
pub fn find_similar_pairs(
    records: &[EmbeddingRecord],
    threshold: f64,
) -> Result<Vec<SimilarityMatch>> {
    let embedded: Vec<&EmbeddingRecord> = records.iter().filter(|r| r.has_embedding()).collect();

    let mut matches = Vec::new();
    for (i, first) in embedded.iter().enumerate() {
        for second in embedded.iter().skip(i + 1) {
            let similarity = cosine_similarity(&first.embedding, &second.embedding)?;
            if similarity > threshold {
                matches.push(SimilarityMatch {
                    file1: first.filename.clone(),
                    file2: second.filename.clone(),
                    similarity,
                    code1: first.code.clone(),
                    code2: second.code.clone(),
                });
            }
        }
    }

    matches.sort_by_key(|m| Reverse(OrderedFloat(m.similarity)));

    debug!(
        "Found {} similar pairs above threshold {threshold}",
        matches.len()
    );

    Ok(matches)
}
