//! Minimal document ingestion and semantic search pipeline.
//!
//! This crate provides:
//! - File validation and text extraction for PDF and plain-text uploads
//! - Whitespace normalization and overlapping word-window chunking
//! - Batch embedding via an OpenAI-compatible provider
//! - Top-k cosine similarity search with a brute-force fallback when no
//!   vector index is available
//! - Document/chunk persistence (PostgreSQL + pgvector, or in-memory)

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod memory;
pub mod openai;
pub mod pipeline;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod search;
pub mod store;
pub mod text;

pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, Document, HealthStatus, IngestReport, QueryReport, SearchResult, StoreStats,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{FileKind, FileValidator};
pub use memory::InMemoryStore;
pub use openai::OpenAiEmbeddingProvider;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
pub use search::{SearchEngine, cosine_similarity};
pub use store::DocumentStore;
pub use text::{Chunker, WordWindowChunker, clean};
