use serde::{Deserialize, Serialize};

/// Default chunk size in characters, matching what the ingestion pipeline
/// has always fed the embedding model.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Configuration for text chunking behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Soft chunk size in characters. A chunk is closed as soon as its
    /// accumulated cost (word length + 1 per word) reaches this value.
    pub chunk_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkerConfig {
    /// Smaller chunks for embedding models with short context windows
    #[must_use]
    pub const fn for_short_context() -> Self {
        Self { chunk_size: 500 }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }
        Ok(())
    }
}
