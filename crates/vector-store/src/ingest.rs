use crate::error::VectorStoreError;
use crate::service::RetrievalService;
use crate::types::IngestReport;
use docqa_text_chunker::Chunker;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Feeds extracted document text into a [`RetrievalService`] chunk by chunk.
///
/// Each chunk is labeled with its source and 1-based page ordinal, embedded,
/// and added with its precomputed embedding. A chunk that cannot be embedded
/// or appended is skipped; the rest of the source still goes in. A chunk whose
/// append succeeded but whose save failed counts as added and unsaved. A
/// source name is ingested at most once per `Ingestor`.
pub struct Ingestor {
    service: Arc<RetrievalService>,
    chunker: Chunker,
    processed: Mutex<HashSet<String>>,
}

impl Ingestor {
    #[must_use]
    pub fn new(service: Arc<RetrievalService>, chunker: Chunker) -> Self {
        Self {
            service,
            chunker,
            processed: Mutex::new(HashSet::new()),
        }
    }

    /// Whether `source` was already claimed by this ingestor
    pub async fn is_processed(&self, source: &str) -> bool {
        self.processed.lock().await.contains(source)
    }

    pub async fn ingest_text(&self, source: &str, text: &str) -> IngestReport {
        if !self.processed.lock().await.insert(source.to_string()) {
            log::info!("Source {source} already processed, skipping");
            return IngestReport {
                source: source.to_string(),
                total_chunks: 0,
                added_chunks: 0,
                unsaved_chunks: 0,
                failed_chunks: 0,
                already_processed: true,
            };
        }

        let chunks = self.chunker.chunk_str(text, Some(source));
        log::info!("Created {} chunks from {source}", chunks.len());

        let embedder = self.service.embedder();
        let mut added_chunks = 0;
        let mut unsaved_chunks = 0;
        for chunk in &chunks {
            let labeled = chunk.labeled();
            let page = chunk.index + 1;

            let Some(embedding) = embedder.embed(&labeled).await else {
                log::error!("Failed to get embedding for chunk {page} of {source}");
                continue;
            };
            match self.service.try_add_document(&labeled, Some(embedding)).await {
                Ok(position) => {
                    added_chunks += 1;
                    log::debug!(
                        "Added chunk {page}/{} from {source} at position {position}",
                        chunks.len()
                    );
                }
                Err(VectorStoreError::Persist(err)) => {
                    added_chunks += 1;
                    unsaved_chunks += 1;
                    log::error!("Chunk {page} of {source} added but not saved: {err}");
                }
                Err(err) => log::error!("Failed to store chunk {page} of {source}: {err}"),
            }
        }

        log::info!(
            "Successfully added {added_chunks}/{} chunks from {source}",
            chunks.len()
        );
        IngestReport {
            source: source.to_string(),
            total_chunks: chunks.len(),
            added_chunks,
            unsaved_chunks,
            failed_chunks: chunks.len() - added_chunks,
            already_processed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::embeddings::{EmbeddingProvider, StubEmbedder};
    use crate::types::Embedding;
    use async_trait::async_trait;
    use docqa_text_chunker::ChunkerConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DIM: usize = 8;

    /// Refuses to embed any text mentioning "secret".
    struct PickyEmbedder(StubEmbedder);

    #[async_trait]
    impl EmbeddingProvider for PickyEmbedder {
        async fn embed(&self, text: &str) -> Option<Embedding> {
            if text.contains("secret") {
                None
            } else {
                self.0.embed(text).await
            }
        }

        fn name(&self) -> &str {
            "picky"
        }
    }

    async fn ingestor(tmp: &TempDir, embedder: Arc<dyn EmbeddingProvider>) -> Ingestor {
        let config = StoreConfig::new(tmp.path().join("data"), DIM);
        let service = Arc::new(RetrievalService::open(config, embedder).await.unwrap());
        let chunker = Chunker::new(ChunkerConfig { chunk_size: 12 }).unwrap();
        Ingestor::new(service, chunker)
    }

    #[tokio::test]
    async fn ingests_labeled_chunks() {
        let tmp = TempDir::new().unwrap();
        let ingestor = ingestor(&tmp, Arc::new(StubEmbedder::new(DIM))).await;

        let report = ingestor
            .ingest_text("guide.pdf", "install the package then run it")
            .await;
        assert_eq!(
            report,
            IngestReport {
                source: "guide.pdf".to_string(),
                total_chunks: 3,
                added_chunks: 3,
                unsaved_chunks: 0,
                failed_chunks: 0,
                already_processed: false,
            }
        );

        assert_eq!(
            ingestor.service.document(0).await.unwrap(),
            "[guide.pdf - Page 1] install the"
        );
        let hits = ingestor
            .service
            .search_similar("[guide.pdf - Page 2] package then", 1, 0.99)
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rank, 1);
    }

    #[tokio::test]
    async fn skips_chunks_that_fail_to_embed() {
        let tmp = TempDir::new().unwrap();
        let ingestor = ingestor(&tmp, Arc::new(PickyEmbedder(StubEmbedder::new(DIM)))).await;

        let report = ingestor
            .ingest_text("memo.txt", "public notes secret stuff more public")
            .await;
        assert_eq!(report.total_chunks, 3);
        assert_eq!(report.added_chunks, 2);
        assert_eq!(report.failed_chunks, 1);

        let stats = ingestor.service.stats().await;
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.vectors, 2);
    }

    #[tokio::test]
    async fn save_failures_count_as_unsaved() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the data directory should be makes every save fail.
        std::fs::write(tmp.path().join("data"), b"").unwrap();
        let ingestor = ingestor(&tmp, Arc::new(StubEmbedder::new(DIM))).await;

        let report = ingestor
            .ingest_text("notes.txt", "install the package then run it")
            .await;
        assert_eq!(report.total_chunks, 3);
        assert_eq!(report.added_chunks, 3);
        assert_eq!(report.unsaved_chunks, 3);
        assert_eq!(report.failed_chunks, 0);
        assert_eq!(ingestor.service.stats().await.documents, 3);
    }

    #[tokio::test]
    async fn same_source_is_ingested_once() {
        let tmp = TempDir::new().unwrap();
        let ingestor = ingestor(&tmp, Arc::new(StubEmbedder::new(DIM))).await;

        let first = ingestor.ingest_text("a.pdf", "some words").await;
        assert!(!first.already_processed);
        assert!(ingestor.is_processed("a.pdf").await);

        let second = ingestor.ingest_text("a.pdf", "other words").await;
        assert!(second.already_processed);
        assert_eq!(second.added_chunks, 0);
        assert_eq!(ingestor.service.stats().await.documents, 1);
    }
}
