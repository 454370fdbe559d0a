//! Top-k cosine similarity search with a brute-force fallback.

use std::sync::Arc;

use tracing::debug;

use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

/// Ranks stored chunks against a query vector.
///
/// Two computation paths exist. When the store reports a vector index, the
/// top-k ranking is delegated to it in a single query. Otherwise every
/// stored chunk is scanned and scored here. The switch is a capability
/// probe, not error recovery: a missing index degrades to the scan, it does
/// not fail the request.
///
/// The two paths agree on the exact cosine similarity value; small ranking
/// perturbations between an approximate index and the exact scan are
/// acceptable and expected.
pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
}

impl SearchEngine {
    /// Create a search engine over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Return up to `k` results ordered by descending similarity.
    ///
    /// Requesting more results than there are stored chunks returns all of
    /// them; an empty store returns an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidVector`] for a zero-norm query vector, or
    /// when a stored vector has zero norm or a mismatched dimension.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if l2_norm(query) == 0.0 {
            return Err(RagError::InvalidVector(
                "query vector has zero norm; cosine similarity is undefined".to_string(),
            ));
        }

        if self.store.has_vector_index() {
            let ranked = self.store.nearest_chunks(query, k).await?;
            debug!(path = "indexed", results = ranked.len(), "search completed");
            return Ok(ranked
                .into_iter()
                .map(|(chunk, score)| SearchResult {
                    text: chunk.text,
                    score,
                    document_id: chunk.document_id,
                    chunk_index: chunk.chunk_index,
                })
                .collect());
        }

        // Degrade path: score every stored chunk. One scan, no per-row
        // fetches.
        let chunks = self.store.scan_chunks().await?;
        let mut scored = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let score = cosine_similarity(query, &chunk.embedding)?;
            scored.push(SearchResult {
                text: chunk.text,
                score,
                document_id: chunk.document_id,
                chunk_index: chunk.chunk_index,
            });
        }

        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        debug!(path = "scan", results = scored.len(), "search completed");
        Ok(scored)
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors: `dot(a,b) / (|a| * |b|)`.
///
/// # Errors
///
/// Returns [`RagError::InvalidVector`] if the dimensions differ or either
/// vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::InvalidVector(format!(
            "dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(RagError::InvalidVector(
            "zero-norm vector; cosine similarity is undefined".to_string(),
        ));
    }
    Ok(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.3_f32, -0.5, 0.8];
        let score = cosine_similarity(&v, &v).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_negative_one() {
        let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_vector_is_rejected() {
        let err = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, RagError::InvalidVector(_)));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, RagError::InvalidVector(_)));
    }
}
