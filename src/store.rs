//! Storage trait for documents and their chunk/vector records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::document::{Chunk, Document};
use crate::error::Result;

/// A persistence backend for documents and chunks.
///
/// Implementations uphold two invariants:
///
/// - [`insert_chunks`](DocumentStore::insert_chunks) is atomic: either every
///   chunk of a batch becomes visible or none does.
/// - [`chunks_by_document`](DocumentStore::chunks_by_document) returns chunks
///   in ascending `chunk_index` order.
///
/// Backends with an accelerated vector index report it through
/// [`has_vector_index`](DocumentStore::has_vector_index); the search engine
/// uses that probe to choose between the indexed top-k operator and a
/// brute-force scan over [`scan_chunks`](DocumentStore::scan_chunks).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document record and return it with its assigned identity.
    async fn create_document(&self, filename: &str, content_type: &str) -> Result<Document>;

    /// Insert a batch of chunks atomically.
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Delete a document record and any chunks stored for it.
    ///
    /// The pipeline uses this to compensate when a chunk batch fails after
    /// the document row was created, so no zero-chunk document stays
    /// visible to counts and health probes.
    async fn delete_document(&self, document_id: Uuid) -> Result<()>;

    /// Fetch all chunks of a document, ordered by ascending `chunk_index`.
    async fn chunks_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>>;

    /// Count the chunks stored for a document.
    async fn count_chunks(&self, document_id: Uuid) -> Result<u64>;

    /// Count all stored documents.
    async fn document_count(&self) -> Result<u64>;

    /// Count all stored chunks.
    async fn chunk_count(&self) -> Result<u64>;

    /// Fetch every stored chunk in insertion order.
    ///
    /// Used by the brute-force search fallback; insertion order makes its
    /// stable sort deterministic for tied scores.
    async fn scan_chunks(&self) -> Result<Vec<Chunk>>;

    /// Whether this store can rank chunks with an accelerated vector index.
    fn has_vector_index(&self) -> bool;

    /// Return the `k` chunks nearest to `embedding` by cosine distance,
    /// paired with similarity scores (`1 - distance`), ordered by
    /// descending similarity.
    ///
    /// Only meaningful when [`has_vector_index`](DocumentStore::has_vector_index)
    /// returns `true`. Returned chunks may carry empty embedding vectors;
    /// search results do not need them.
    async fn nearest_chunks(&self, embedding: &[f32], k: usize) -> Result<Vec<(Chunk, f32)>>;

    /// Probe storage reachability.
    async fn ping(&self) -> Result<()>;
}
