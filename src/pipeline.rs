//! Pipeline orchestrator: ingest, query, health, and stats.
//!
//! [`RagPipeline`] composes an [`EmbeddingProvider`], a [`DocumentStore`],
//! and a [`Chunker`] into the full ingest-and-query workflow. Service
//! objects are constructed once at process start and shared behind `Arc`s;
//! every call is an independent unit of work.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use minirag::{RagConfig, RagPipeline, InMemoryStore, OpenAiEmbeddingProvider};
//!
//! let config = RagConfig::from_env()?;
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .embedding_provider(Arc::new(OpenAiEmbeddingProvider::from_env()?))
//!     .store(Arc::new(InMemoryStore::new()))
//!     .build()?;
//!
//! let report = pipeline.ingest("notes.txt", "text/plain", bytes).await?;
//! let answer = pipeline.query("what are the notes about?", None).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::{Chunk, HealthStatus, IngestReport, QueryReport, StoreStats};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::FileValidator;
use crate::search::SearchEngine;
use crate::store::DocumentStore;
use crate::text::{Chunker, WordWindowChunker, clean};

/// Maximum accepted query length in characters.
const MAX_QUERY_CHARS: usize = 1000;

/// Default number of results returned by a query.
const DEFAULT_LIMIT: usize = 3;

/// Maximum number of results a query may request.
const MAX_LIMIT: usize = 10;

/// The ingestion and search pipeline.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    chunker: Arc<dyn Chunker>,
    validator: FileValidator,
    engine: SearchEngine,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline").field("config", &self.config).finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest a file: validate → extract → clean → chunk → embed → store.
    ///
    /// Validation happens before any embedding call so a bad upload never
    /// costs a provider round trip. All chunks of the document embed in one
    /// batch call and land in one atomic storage batch.
    ///
    /// # Errors
    ///
    /// [`RagError::Validation`] for a rejected file or a file with no text
    /// content; [`RagError::Embedding`] / [`RagError::Storage`] when the
    /// respective collaborator fails. Nothing is partially committed: a
    /// failed chunk batch also removes the just-created document row.
    pub async fn ingest(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<IngestReport> {
        let started = Instant::now();

        let kind = self.validator.validate(filename, content_type, bytes.len())?;
        let text = kind.extract_text(bytes)?;
        let cleaned = clean(&text);
        let chunk_texts = self.chunker.chunk(&cleaned);
        if chunk_texts.is_empty() {
            return Err(RagError::Validation("no text content found in file".to_string()));
        }

        let texts: Vec<&str> = chunk_texts.iter().map(String::as_str).collect();
        let embeddings = self.provider.embed_batch(&texts).await.inspect_err(
            |e| error!(filename, error = %e, "embedding failed during ingestion"),
        )?;
        // zip would silently truncate on a miscounted batch; fail instead.
        if embeddings.len() != chunk_texts.len() {
            return Err(RagError::Pipeline(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunk_texts.len()
            )));
        }

        let document = self.store.create_document(filename, content_type).await.inspect_err(
            |e| error!(filename, error = %e, "document creation failed"),
        )?;

        let chunks: Vec<Chunk> = chunk_texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| Chunk {
                id: Uuid::new_v4(),
                document_id: document.id,
                chunk_index,
                text,
                embedding,
                created_at: Utc::now(),
            })
            .collect();

        if let Err(e) = self.store.insert_chunks(&chunks).await {
            error!(document_id = %document.id, error = %e, "chunk batch insert failed");
            // Compensate so the document row doesn't linger with zero chunks.
            if let Err(cleanup) = self.store.delete_document(document.id).await {
                warn!(document_id = %document.id, error = %cleanup, "cleanup after failed ingest also failed");
            }
            return Err(e);
        }

        let processing_time = started.elapsed().as_secs_f64();
        info!(
            document_id = %document.id,
            chunk_count = chunks.len(),
            processing_time,
            "ingested document"
        );

        Ok(IngestReport {
            document_id: document.id,
            filename: filename.to_string(),
            chunks_processed: chunks.len(),
            processing_time,
            message: "document ingested successfully".to_string(),
        })
    }

    /// Run a semantic search: embed the query and rank stored chunks.
    ///
    /// `limit` defaults to 3 and must lie in `1..=10`; the query string must
    /// be 1 to 1000 characters.
    ///
    /// # Errors
    ///
    /// [`RagError::Validation`] for bad query parameters;
    /// [`RagError::Embedding`] / [`RagError::InvalidVector`] /
    /// [`RagError::Storage`] from the downstream stages.
    pub async fn query(&self, query: &str, limit: Option<usize>) -> Result<QueryReport> {
        let started = Instant::now();

        let chars = query.chars().count();
        if chars == 0 || chars > MAX_QUERY_CHARS {
            return Err(RagError::Validation(format!(
                "query must be 1 to {MAX_QUERY_CHARS} characters, got {chars}"
            )));
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(RagError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }

        let query_embedding = self
            .provider
            .embed(query)
            .await
            .inspect_err(|e| error!(error = %e, "embedding failed during query"))?;

        let results = self.engine.search(&query_embedding, limit).await?;

        let processing_time = started.elapsed().as_secs_f64();
        info!(result_count = results.len(), processing_time, "query completed");

        Ok(QueryReport { query: query.to_string(), results, processing_time })
    }

    /// Report storage reachability. Never fails: degraded states come back
    /// as data.
    pub async fn health(&self) -> HealthStatus {
        match self.store.ping().await {
            Ok(()) => {
                let document_count = match self.store.document_count().await {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(error = %e, "document count failed during health check");
                        return HealthStatus {
                            healthy: false,
                            storage_connected: true,
                            document_count: 0,
                        };
                    }
                };
                HealthStatus { healthy: true, storage_connected: true, document_count }
            }
            Err(e) => {
                warn!(error = %e, "storage unreachable during health check");
                HealthStatus { healthy: false, storage_connected: false, document_count: 0 }
            }
        }
    }

    /// Report corpus statistics. The average is 0.0 when no documents
    /// exist.
    pub async fn stats(&self) -> Result<StoreStats> {
        let total_documents = self.store.document_count().await?;
        let total_chunks = self.store.chunk_count().await?;
        let average_chunks_per_document = if total_documents == 0 {
            0.0
        } else {
            total_chunks as f64 / total_documents as f64
        };
        Ok(StoreStats { total_documents, total_chunks, average_chunks_per_document })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider`, and `store` are required; the chunker
/// defaults to a [`WordWindowChunker`] built from the config.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the document store backend.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the chunking strategy.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that required fields are set
    /// and that the provider's dimensionality matches the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] on a missing field or a dimension
    /// mismatch.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;

        if provider.dimensions() != config.dimensions {
            return Err(RagError::Config(format!(
                "provider produces {}-dimensional embeddings but config expects {}",
                provider.dimensions(),
                config.dimensions
            )));
        }

        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(WordWindowChunker::new(config.chunk_size, config.chunk_overlap))
        });
        let validator = FileValidator::new(config.max_file_size);
        let engine = SearchEngine::new(Arc::clone(&store));

        Ok(RagPipeline { config, provider, store, chunker, validator, engine })
    }
}
