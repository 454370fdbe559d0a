//! The indexed and brute-force search paths agree over identical data.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use minirag::document::{Chunk, Document};
use minirag::error::Result;
use minirag::memory::InMemoryStore;
use minirag::search::{SearchEngine, cosine_similarity};
use minirag::store::DocumentStore;

const DIM: usize = 8;

/// A store that serves top-k ranking through `nearest_chunks` with exact
/// cosine scores, so searches against it take the indexed branch.
struct CosineIndexStore {
    inner: InMemoryStore,
}

impl CosineIndexStore {
    fn new() -> Self {
        Self { inner: InMemoryStore::new() }
    }
}

#[async_trait]
impl DocumentStore for CosineIndexStore {
    async fn create_document(&self, filename: &str, content_type: &str) -> Result<Document> {
        self.inner.create_document(filename, content_type).await
    }

    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        self.inner.insert_chunks(chunks).await
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<()> {
        self.inner.delete_document(document_id).await
    }

    async fn chunks_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>> {
        self.inner.chunks_by_document(document_id).await
    }

    async fn count_chunks(&self, document_id: Uuid) -> Result<u64> {
        self.inner.count_chunks(document_id).await
    }

    async fn document_count(&self) -> Result<u64> {
        self.inner.document_count().await
    }

    async fn chunk_count(&self) -> Result<u64> {
        self.inner.chunk_count().await
    }

    async fn scan_chunks(&self) -> Result<Vec<Chunk>> {
        self.inner.scan_chunks().await
    }

    fn has_vector_index(&self) -> bool {
        true
    }

    async fn nearest_chunks(&self, embedding: &[f32], k: usize) -> Result<Vec<(Chunk, f32)>> {
        let chunks = self.inner.scan_chunks().await?;
        let mut scored = chunks
            .into_iter()
            .map(|chunk| {
                let score = cosine_similarity(embedding, &chunk.embedding)?;
                Ok((chunk, score))
            })
            .collect::<Result<Vec<_>>>()?;
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }
}

/// Deterministic non-zero vector for a seed value.
fn vector(seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..DIM)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / u32::MAX as f32) - 0.25
        })
        .collect()
}

/// Seed `count` chunks with deterministic embeddings; chunk `i` carries
/// `vector(i + 1)`.
async fn seed(store: &dyn DocumentStore, count: usize) -> Uuid {
    let document = store.create_document("fixture.txt", "text/plain").await.unwrap();
    let chunks: Vec<Chunk> = (0..count)
        .map(|chunk_index| Chunk {
            id: Uuid::new_v4(),
            document_id: document.id,
            chunk_index,
            text: format!("chunk {chunk_index}"),
            embedding: vector(chunk_index as u64 + 1),
            created_at: Utc::now(),
        })
        .collect();
    store.insert_chunks(&chunks).await.unwrap();
    document.id
}

#[tokio::test]
async fn indexed_and_scan_paths_agree_on_top_result() {
    let scan_store = Arc::new(InMemoryStore::new());
    let indexed_store = Arc::new(CosineIndexStore::new());
    seed(scan_store.as_ref(), 40).await;
    seed(indexed_store.as_ref(), 40).await;

    let scan_engine = SearchEngine::new(scan_store);
    let indexed_engine = SearchEngine::new(indexed_store);

    for q in 0..10u64 {
        let query = vector(1000 + q);
        let scan_results = scan_engine.search(&query, 5).await.unwrap();
        let indexed_results = indexed_engine.search(&query, 5).await.unwrap();

        assert_eq!(scan_results.len(), 5);
        assert_eq!(indexed_results.len(), 5);

        let scan_top = &scan_results[0];
        let indexed_top = &indexed_results[0];
        assert_eq!(scan_top.text, indexed_top.text, "top-1 diverged for query {q}");
        assert_eq!(scan_top.chunk_index, indexed_top.chunk_index);
        assert!((scan_top.score - indexed_top.score).abs() < 1e-6);
    }
}

#[tokio::test]
async fn indexed_branch_maps_chunk_fields_into_results() {
    let store = Arc::new(CosineIndexStore::new());
    let document_id = seed(store.as_ref(), 3).await;
    let engine = SearchEngine::new(store);

    // Query with chunk 1's own embedding: it must come back first, intact.
    let results = engine.search(&vector(2), 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "chunk 1");
    assert_eq!(results[0].chunk_index, 1);
    assert_eq!(results[0].document_id, document_id);
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn indexed_path_handles_k_beyond_stored_chunks() {
    let store = Arc::new(CosineIndexStore::new());
    seed(store.as_ref(), 3).await;
    let engine = SearchEngine::new(store);

    let results = engine.search(&vector(7), 10).await.unwrap();
    assert_eq!(results.len(), 3);
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}
