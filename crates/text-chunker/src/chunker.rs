use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::types::TextChunk;
use std::path::Path;

/// Main chunker interface for splitting document text
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk text from a string. Whitespace-only input yields no chunks.
    #[must_use]
    pub fn chunk_str(&self, content: &str, source: Option<&str>) -> Vec<TextChunk> {
        let source = source.unwrap_or("unknown");
        log::debug!(
            "Chunking {} chars from '{}' (chunk_size: {})",
            content.len(),
            source,
            self.config.chunk_size
        );

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;

        for word in content.split_whitespace() {
            current.push(word);
            current_size += word.chars().count() + 1;
            if current_size >= self.config.chunk_size {
                chunks.push(TextChunk::new(
                    source.to_string(),
                    chunks.len(),
                    current.join(" "),
                ));
                current.clear();
                current_size = 0;
            }
        }

        if !current.is_empty() {
            chunks.push(TextChunk::new(
                source.to_string(),
                chunks.len(),
                current.join(" "),
            ));
        }

        log::debug!("Created {} chunks from '{}'", chunks.len(), source);
        chunks
    }

    /// Chunk text read from a UTF-8 file; the file name becomes the source.
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<Vec<TextChunk>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown");
        Ok(self.chunk_str(&content, Some(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_input() {
        let chunker = Chunker::default();
        assert!(chunker.chunk_str("", None).is_empty());
        assert!(chunker.chunk_str(" \n\t  ", None).is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("one  two\nthree", Some("a.txt"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "one two three");
        assert_eq!(chunks[0].source, "a.txt");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_chunk_closes_once_size_reached() {
        // "abcd" costs 5, so two words reach chunk_size = 10 exactly.
        let chunker = Chunker::new(ChunkerConfig { chunk_size: 10 }).unwrap();
        let chunks = chunker.chunk_str("abcd efgh ijkl", None);
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd efgh", "ijkl"]);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].source, "unknown");
    }

    #[test]
    fn test_oversized_word_forms_its_own_chunk() {
        let chunker = Chunker::new(ChunkerConfig { chunk_size: 4 }).unwrap();
        let chunks = chunker.chunk_str("supercalifragilistic ok", None);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "supercalifragilistic");
        assert_eq!(chunks[1].content, "ok");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Chunker::new(ChunkerConfig { chunk_size: 0 }).unwrap_err();
        assert!(matches!(err, ChunkerError::InvalidConfig(_)));
    }

    #[test]
    fn test_character_count_not_byte_count() {
        // Each "ééé" is 3 chars (6 bytes), costing 4.
        let chunker = Chunker::new(ChunkerConfig { chunk_size: 8 }).unwrap();
        let chunks = chunker.chunk_str("ééé ééé ééé", None);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].word_count(), 2);
    }
}
