//! Data types for documents, chunks, search results, and operation reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ingested source document. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: Uuid,
    /// Original filename as supplied at ingest time.
    pub filename: String,
    /// MIME content type as supplied at ingest time.
    pub content_type: String,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
}

/// A segment of a [`Document`]'s text with its vector embedding.
///
/// For a given document, `chunk_index` values are unique and form a dense
/// `0..N-1` sequence in windowing order. `embedding.len()` equals the
/// deployment's vector dimension for every stored chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: Uuid,
    /// The ID of the parent [`Document`].
    pub document_id: Uuid,
    /// 0-based position of this chunk within the document.
    pub chunk_index: usize,
    /// The text span covered by this chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// When the chunk was created.
    pub created_at: DateTime<Utc>,
}

/// A retrieved chunk paired with its cosine similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The text of the retrieved chunk.
    pub text: String,
    /// Cosine similarity in `[-1, 1]` (higher is more relevant).
    pub score: f32,
    /// The ID of the document the chunk belongs to.
    pub document_id: Uuid,
    /// The chunk's position within its document.
    pub chunk_index: usize,
}

/// Summary returned by a successful ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// The ID of the newly created document.
    pub document_id: Uuid,
    /// The ingested filename.
    pub filename: String,
    /// Number of chunks stored for the document.
    pub chunks_processed: usize,
    /// Elapsed processing time in seconds.
    pub processing_time: f64,
    /// Human-readable status message.
    pub message: String,
}

/// Ranked results returned by a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    /// The original query string.
    pub query: String,
    /// Results ordered by descending similarity.
    pub results: Vec<SearchResult>,
    /// Elapsed processing time in seconds.
    pub processing_time: f64,
}

/// Storage reachability report. Degraded states are data, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Whether the service considers itself healthy.
    pub healthy: bool,
    /// Whether the storage backend answered a reachability probe.
    pub storage_connected: bool,
    /// Document count sampled from storage (0 when unreachable).
    pub document_count: u64,
}

/// Aggregate counts over the stored corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of documents.
    pub total_documents: u64,
    /// Total number of chunks across all documents.
    pub total_chunks: u64,
    /// Average chunks per document; 0.0 when no documents exist.
    pub average_chunks_per_document: f64,
}
