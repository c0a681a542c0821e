use serde::{Deserialize, Serialize};

/// Fixed-length embedding vector. The length is the configured dimension.
pub type Embedding = Vec<f32>;

/// One retrieved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    /// `1 / (1 + distance)`, in `(0, 1]`, higher is closer.
    pub score: f32,
    /// 1-based position in distance order before threshold filtering.
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub documents: usize,
    pub vectors: usize,
    pub dimension: usize,
}

/// Outcome of ingesting one named source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub source: String,
    pub total_chunks: usize,
    /// Chunks committed to the in-memory corpus and searchable.
    pub added_chunks: usize,
    /// Added chunks whose snapshot save failed; they are lost on restart
    /// unless a later save or flush succeeds.
    pub unsaved_chunks: usize,
    /// Chunks that could not be embedded or appended and were skipped.
    pub failed_chunks: usize,
    /// The source was ingested earlier in this process and was skipped.
    pub already_processed: bool,
}

/// Bounded, higher-is-better similarity for a Euclidean distance.
#[must_use]
pub fn similarity_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}
