//! PostgreSQL document store with optional pgvector acceleration.
//!
//! Provides [`PgStore`], a [`DocumentStore`] built on
//! [sqlx](https://docs.rs/sqlx). When the
//! [pgvector](https://github.com/pgvector/pgvector) extension is available,
//! chunk embeddings are stored in a `vector(D)` column and top-k queries use
//! the `<=>` cosine distance operator. When the extension cannot be created,
//! startup does not fail: embeddings are stored as text and the store
//! reports no vector index, which routes every search through the
//! brute-force scan.
//!
//! Only available when the `postgres` feature is enabled (default).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

/// A [`DocumentStore`] backed by PostgreSQL.
///
/// Schema: a `documents` table and a `chunks` table linked by
/// `document_id`, with a uniqueness constraint on
/// `(document_id, chunk_index)`.
pub struct PgStore {
    pool: PgPool,
    dimensions: usize,
    vector_index: bool,
}

impl PgStore {
    /// Connect to the given database URL and prepare the schema.
    ///
    /// Attempts `CREATE EXTENSION IF NOT EXISTS vector`; if that fails the
    /// store still comes up, with [`has_vector_index`](DocumentStore::has_vector_index)
    /// reporting `false`.
    pub async fn connect(database_url: &str, dimensions: usize) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_err)?;
        Self::from_pool(pool, dimensions).await
    }

    /// Build a store from an existing connection pool and prepare the schema.
    pub async fn from_pool(pool: PgPool, dimensions: usize) -> Result<Self> {
        let vector_index =
            match sqlx::query("CREATE EXTENSION IF NOT EXISTS vector").execute(&pool).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "pgvector extension unavailable; searches will use the brute-force scan");
                    false
                }
            };

        let store = Self { pool, dimensions, vector_index };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (\
                id UUID PRIMARY KEY, \
                filename TEXT NOT NULL, \
                content_type TEXT NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL\
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        let embedding_column = if self.vector_index {
            format!("vector({})", self.dimensions)
        } else {
            "TEXT".to_string()
        };
        let create_chunks = format!(
            "CREATE TABLE IF NOT EXISTS chunks (\
                id UUID PRIMARY KEY, \
                document_id UUID NOT NULL REFERENCES documents(id), \
                chunk_index BIGINT NOT NULL, \
                chunk_text TEXT NOT NULL, \
                embedding {embedding_column} NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL, \
                seq BIGSERIAL, \
                UNIQUE (document_id, chunk_index)\
            )"
        );
        sqlx::query(&create_chunks).execute(&self.pool).await.map_err(map_err)?;

        debug!(vector_index = self.vector_index, dimensions = self.dimensions, "schema ready");
        Ok(())
    }
}

fn map_err(e: sqlx::Error) -> RagError {
    RagError::Storage { backend: "postgres".to_string(), message: e.to_string() }
}

/// Render an embedding in pgvector's text literal form, `[a,b,c]`.
///
/// The same literal is stored in the TEXT column when pgvector is absent,
/// so reads parse one format either way.
fn embedding_literal(embedding: &[f32]) -> String {
    format!("[{}]", embedding.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
}

fn parse_embedding(text: &str) -> Result<Vec<f32>> {
    serde_json::from_str(text).map_err(|e| {
        RagError::InvalidVector(format!("stored embedding is unreadable: {e}"))
    })
}

fn chunk_from_row(row: &sqlx::postgres::PgRow, with_embedding: bool) -> Result<Chunk> {
    let embedding = if with_embedding {
        let text: String = row.get("embedding_text");
        parse_embedding(&text)?
    } else {
        Vec::new()
    };
    let chunk_index: i64 = row.get("chunk_index");
    let created_at: DateTime<Utc> = row.get("created_at");
    Ok(Chunk {
        id: row.get("id"),
        document_id: row.get("document_id"),
        chunk_index: chunk_index as usize,
        text: row.get("chunk_text"),
        embedding,
        created_at,
    })
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn create_document(&self, filename: &str, content_type: &str) -> Result<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO documents (id, filename, content_type, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(document.id)
        .bind(&document.filename)
        .bind(&document.content_type)
        .bind(document.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(document)
    }

    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let insert_sql = if self.vector_index {
            "INSERT INTO chunks (id, document_id, chunk_index, chunk_text, embedding, created_at) \
             VALUES ($1, $2, $3, $4, $5::vector, $6)"
        } else {
            "INSERT INTO chunks (id, document_id, chunk_index, chunk_text, embedding, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        };

        // One transaction for the whole batch; an error drops it and rolls
        // everything back.
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        for chunk in chunks {
            sqlx::query(insert_sql)
                .bind(chunk.id)
                .bind(chunk.document_id)
                .bind(chunk.chunk_index as i64)
                .bind(&chunk.text)
                .bind(embedding_literal(&chunk.embedding))
                .bind(chunk.created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_err)?;
        }
        tx.commit().await.map_err(map_err)?;

        debug!(count = chunks.len(), "inserted chunk batch");
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        sqlx::query("DELETE FROM chunks WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        tx.commit().await.map_err(map_err)?;
        Ok(())
    }

    async fn chunks_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, chunk_text, \
                    embedding::text AS embedding_text, created_at \
             FROM chunks WHERE document_id = $1 ORDER BY chunk_index",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        rows.iter().map(|row| chunk_from_row(row, true)).collect()
    }

    async fn count_chunks(&self, document_id: Uuid) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn document_count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn chunk_count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn scan_chunks(&self) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, chunk_text, \
                    embedding::text AS embedding_text, created_at \
             FROM chunks ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        rows.iter().map(|row| chunk_from_row(row, true)).collect()
    }

    fn has_vector_index(&self) -> bool {
        self.vector_index
    }

    async fn nearest_chunks(&self, embedding: &[f32], k: usize) -> Result<Vec<(Chunk, f32)>> {
        if !self.vector_index {
            return Err(RagError::Storage {
                backend: "postgres".to_string(),
                message: "pgvector extension is not installed".to_string(),
            });
        }

        // Single query carries every column a result needs; no per-row
        // candidate re-fetch.
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, chunk_text, created_at, \
                    1 - (embedding <=> $1::vector) AS score \
             FROM chunks \
             ORDER BY embedding <=> $1::vector \
             LIMIT $2",
        )
        .bind(embedding_literal(embedding))
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        rows.iter()
            .map(|row| {
                let chunk = chunk_from_row(row, false)?;
                let score: f64 = row.get("score");
                Ok((chunk, score as f32))
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(map_err)?;
        Ok(())
    }
}
