//! # docqa Vector Store
//!
//! Document store and exact nearest-neighbor retrieval for question answering
//! over uploaded documents.
//!
//! ## Features
//!
//! - **Exact k-NN search** by Euclidean distance, ties broken by position
//! - **Aligned storage**: vector `i` always belongs to document `i`
//! - **Paired snapshots** written atomically, loaded fail-open
//! - **Single-writer / multi-reader** access through [`RetrievalService`]
//! - **Chunked ingestion** of extracted document text
//!
//! ## Architecture
//!
//! ```text
//! caller (HTTP handler, ingestion, CLI)
//!     │
//!     └──> RetrievalService ──(no lock held)──> EmbeddingProvider
//!            │
//!            ├──> RwLock<Corpus>
//!            │      ├─> VectorIndex    (positions → vectors)
//!            │      └─> DocumentStore  (positions → texts)
//!            │
//!            └──> PersistenceManager
//!                   └─> data/vectors.bin + data/documents.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docqa_vector_store::{RetrievalService, StoreConfig, StubEmbedder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> docqa_vector_store::Result<()> {
//!     let config = StoreConfig::new("data", 768);
//!     let service = RetrievalService::open(config, Arc::new(StubEmbedder::new(768))).await?;
//!
//!     service.add_document("Rust has no garbage collector.", None).await;
//!
//!     for hit in service.search_similar("memory management in Rust", 5, 0.1).await {
//!         println!("#{} {:.3} {}", hit.rank, hit.score, hit.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod corpus;
mod document_store;
mod embeddings;
mod error;
mod ingest;
mod paths;
mod service;
mod snapshot;
mod types;
mod vector_index;

pub use config::{
    StoreConfig, DEFAULT_DIMENSION, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K, ENV_DATA_DIR,
    ENV_DIMENSION, ENV_SIMILARITY_THRESHOLD, ENV_TOP_K,
};
pub use corpus::Corpus;
pub use document_store::DocumentStore;
pub use embeddings::{EmbeddingProvider, StubEmbedder};
pub use error::{Result, VectorStoreError};
pub use ingest::Ingestor;
pub use paths::{DOCUMENTS_FILE_NAME, INDEX_FILE_NAME};
pub use service::RetrievalService;
pub use snapshot::{PersistenceManager, DOCUMENTS_SCHEMA_VERSION};
pub use types::{similarity_score, Embedding, IngestReport, SearchHit, StoreStats};
pub use vector_index::VectorIndex;

// Re-export chunker types for convenience
pub use docqa_text_chunker::{Chunker, ChunkerConfig, TextChunk};
