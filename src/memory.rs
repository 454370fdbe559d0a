//! In-memory document store.
//!
//! [`InMemoryStore`] keeps documents and chunks in maps behind a
//! `tokio::sync::RwLock`. It reports no vector index, so every search
//! against it exercises the brute-force fallback path. Suitable for
//! development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    // Kept in insertion order; scan_chunks relies on it for stable ties.
    chunks: Vec<Chunk>,
}

/// A [`DocumentStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_document(&self, filename: &str, content_type: &str) -> Result<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.write().await;
        inner.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        // Single write-lock section: the whole batch lands or none of it.
        let mut inner = self.inner.write().await;
        for chunk in chunks {
            if !inner.documents.contains_key(&chunk.document_id) {
                return Err(RagError::Storage {
                    backend: "memory".to_string(),
                    message: format!("unknown document id {}", chunk.document_id),
                });
            }
        }
        inner.chunks.extend_from_slice(chunks);
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.documents.remove(&document_id);
        inner.chunks.retain(|c| c.document_id != document_id);
        Ok(())
    }

    async fn chunks_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        let mut chunks: Vec<Chunk> =
            inner.chunks.iter().filter(|c| c.document_id == document_id).cloned().collect();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    async fn count_chunks(&self, document_id: Uuid) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner.chunks.iter().filter(|c| c.document_id == document_id).count() as u64)
    }

    async fn document_count(&self) -> Result<u64> {
        Ok(self.inner.read().await.documents.len() as u64)
    }

    async fn chunk_count(&self) -> Result<u64> {
        Ok(self.inner.read().await.chunks.len() as u64)
    }

    async fn scan_chunks(&self) -> Result<Vec<Chunk>> {
        Ok(self.inner.read().await.chunks.clone())
    }

    fn has_vector_index(&self) -> bool {
        false
    }

    async fn nearest_chunks(&self, _embedding: &[f32], _k: usize) -> Result<Vec<(Chunk, f32)>> {
        Err(RagError::Storage {
            backend: "memory".to_string(),
            message: "no vector index available".to_string(),
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
