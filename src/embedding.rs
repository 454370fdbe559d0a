//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap an external embedding backend behind a unified async
/// interface. A single call attempt is made per invocation; retry policy is
/// the caller's concern.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends with
/// native batching must override it so a whole document embeds in one
/// provider call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Output order matches input order: index `i` of the output is the
    /// embedding of input `i`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Verify that a provider's batch response upholds the protocol: one
/// embedding per input, each of the expected dimension.
pub(crate) fn check_batch(
    provider: &str,
    embeddings: &[Vec<f32>],
    expected_count: usize,
    dimensions: usize,
) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(RagError::Embedding {
            provider: provider.to_string(),
            message: format!(
                "provider returned {} embeddings for {expected_count} inputs",
                embeddings.len()
            ),
        });
    }
    for (i, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != dimensions {
            return Err(RagError::Embedding {
                provider: provider.to_string(),
                message: format!(
                    "embedding {i} has dimension {}, expected {dimensions}",
                    embedding.len()
                ),
            });
        }
    }
    Ok(())
}
