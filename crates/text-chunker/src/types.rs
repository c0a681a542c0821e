use serde::{Deserialize, Serialize};

/// A window of consecutive words taken from one source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    /// Name of the source document (file name, URL, ...)
    pub source: String,

    /// Position of this chunk within its source (0-indexed)
    pub index: usize,

    /// Words of the chunk joined by single spaces
    pub content: String,
}

impl TextChunk {
    #[must_use]
    pub const fn new(source: String, index: usize, content: String) -> Self {
        Self {
            source,
            index,
            content,
        }
    }

    /// Content prefixed with its provenance, e.g. `[report.pdf - Page 3] ...`.
    ///
    /// Page numbers are 1-based chunk ordinals, not physical PDF pages.
    #[must_use]
    pub fn labeled(&self) -> String {
        format!("[{} - Page {}] {}", self.source, self.index + 1, self.content)
    }

    /// Number of words in this chunk
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}
