//! Configuration for the ingestion and search pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default chunk window size in whitespace-separated tokens.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive chunk windows, in tokens.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Default maximum accepted file size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default embedding model identifier.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Default embedding vector dimension.
pub const DEFAULT_DIMENSIONS: usize = 768;

/// Configuration parameters for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Chunk window size in whitespace-separated tokens.
    pub chunk_size: usize,
    /// Number of overlapping tokens between consecutive chunks.
    pub chunk_overlap: usize,
    /// Maximum accepted file size in bytes.
    pub max_file_size: usize,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Embedding vector dimension; constant per deployment.
    pub dimensions: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads `CHUNK_SIZE`, `CHUNK_OVERLAP`, `MAX_FILE_SIZE`,
    /// `EMBEDDING_MODEL`, and `EMBEDDING_DIMENSIONS`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a variable is present but unparsable,
    /// or if the resulting configuration fails validation.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(size) = env_usize("CHUNK_SIZE")? {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = env_usize("CHUNK_OVERLAP")? {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(max) = env_usize("MAX_FILE_SIZE")? {
            builder = builder.max_file_size(max);
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Some(dims) = env_usize("EMBEDDING_DIMENSIONS")? {
            builder = builder.dimensions(dims);
        }

        builder.build()
    }
}

/// Read an environment variable as a `usize`, treating absence as `None`.
fn env_usize(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{name} must be a non-negative integer, got '{value}'"))),
        Err(_) => Ok(None),
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk window size in tokens.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in tokens.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the maximum accepted file size in bytes.
    pub fn max_file_size(mut self, max: usize) -> Self {
        self.config.max_file_size = max;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the embedding vector dimension.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `dimensions == 0`
    /// - `max_file_size == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.dimensions == 0 {
            return Err(RagError::Config("dimensions must be greater than zero".to_string()));
        }
        if self.config.max_file_size == 0 {
            return Err(RagError::Config("max_file_size must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
