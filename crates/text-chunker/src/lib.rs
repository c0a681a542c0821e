//! # docqa Text Chunker
//!
//! Word-window chunking of extracted document text before embedding.
//!
//! ## Policy
//!
//! Text is split on whitespace. Words are accumulated into the current chunk,
//! each costing its character length plus one for the joining space. Once the
//! accumulated cost reaches the configured `chunk_size` the chunk is closed and
//! a new one starts. A trailing partial chunk is always kept, so no word is
//! ever dropped.
//!
//! ```text
//! Document text
//!     │
//!     ├──> split_whitespace()
//!     │
//!     ├──> accumulate until cost >= chunk_size
//!     │
//!     └──> TextChunk[] (source, index, content)
//!            └─> labeled(): "[source - Page n] content"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docqa_text_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig { chunk_size: 11 }).unwrap();
//! let chunks = chunker.chunk_str("alpha beta gamma delta", Some("notes.pdf"));
//!
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[0].labeled(), "[notes.pdf - Page 1] alpha beta");
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::TextChunk;
