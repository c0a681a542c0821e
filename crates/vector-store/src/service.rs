use crate::config::StoreConfig;
use crate::corpus::Corpus;
use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, VectorStoreError};
use crate::snapshot::PersistenceManager;
use crate::types::{similarity_score, Embedding, SearchHit, StoreStats};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Entry point for every mutation and query of the corpus.
///
/// The index and the document store live behind one `RwLock`: searches share
/// the read side, appends take the write side, and the embedding provider is
/// only ever called with no lock held.
pub struct RetrievalService {
    corpus: RwLock<Corpus>,
    persistence: PersistenceManager,
    embedder: Arc<dyn EmbeddingProvider>,
    config: StoreConfig,
}

impl RetrievalService {
    /// Load the snapshot under `config.data_dir` (or start empty) and wrap it.
    pub async fn open(config: StoreConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Opening document store at {:?} (dimension {}, embedder {})",
            config.data_dir,
            config.dimension,
            embedder.name()
        );
        let persistence = PersistenceManager::new(&config);
        let corpus = persistence.load().await;
        Ok(Self {
            corpus: RwLock::new(corpus),
            persistence,
            embedder,
            config,
        })
    }

    /// Wrap an already built corpus. Its dimension must match the config.
    pub fn with_corpus(
        config: StoreConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        corpus: Corpus,
    ) -> Result<Self> {
        config.validate()?;
        if corpus.dimension() != config.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: config.dimension,
                actual: corpus.dimension(),
            });
        }
        Ok(Self {
            persistence: PersistenceManager::new(&config),
            corpus: RwLock::new(corpus),
            embedder,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn embedder(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.embedder)
    }

    /// Add a document, embedding it first when no embedding is supplied.
    ///
    /// Returns `true` only if embedding, append and save all succeeded. When
    /// only the save fails the document stays in memory and remains
    /// searchable for the rest of the session; the next successful save or
    /// [`flush`](Self::flush) writes it out.
    pub async fn add_document(&self, text: &str, embedding: Option<Embedding>) -> bool {
        log::info!("Adding document to vector store, text length: {}", text.len());
        match self.try_add_document(text, embedding).await {
            Ok(position) => {
                log::info!("Successfully added document at position {position}");
                log::debug!("Document preview: {}", preview(text, 200));
                true
            }
            Err(err) => {
                log::error!("Error adding document to vector store: {err}");
                false
            }
        }
    }

    /// Typed variant of [`add_document`](Self::add_document).
    ///
    /// A `Persist` error means the document was committed in memory but not
    /// written to disk.
    pub async fn try_add_document(
        &self,
        text: &str,
        embedding: Option<Embedding>,
    ) -> Result<usize> {
        let embedding = match embedding {
            Some(embedding) => embedding,
            None => self.embed(text).await?,
        };

        let mut corpus = self.corpus.write().await;
        let position = corpus.append(text, &embedding)?;
        log::debug!(
            "Corpus now holds {} vectors and {} documents",
            corpus.index().len(),
            corpus.documents().len()
        );

        // Save under the read guard: searches proceed, the next writer waits
        // until this snapshot is on disk.
        let corpus = corpus.downgrade();
        self.persistence
            .save(corpus.index(), corpus.documents())
            .await?;
        Ok(position)
    }

    /// Search for documents similar to `query`.
    ///
    /// Degrades to an empty result when the corpus is empty or the provider
    /// is unavailable.
    pub async fn search_similar(
        &self,
        query: &str,
        top_k: usize,
        similarity_threshold: f32,
    ) -> Vec<SearchHit> {
        log::debug!(
            "Searching for: '{}' (top_k: {top_k}, threshold: {similarity_threshold})",
            preview(query, 100)
        );

        if self.corpus.read().await.is_empty() {
            log::warn!("No documents in the index");
            return Vec::new();
        }

        let query_embedding = match self.embed(query).await {
            Ok(embedding) => embedding,
            Err(err) => {
                log::error!("Failed to get embedding for query: {err}");
                return Vec::new();
            }
        };

        match self
            .search_by_embedding(&query_embedding, top_k, similarity_threshold)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                log::error!("Error searching for similar documents: {err}");
                Vec::new()
            }
        }
    }

    /// Search with a precomputed query embedding.
    ///
    /// Ranks are 1-based positions in distance order before the threshold is
    /// applied, so filtered results can have gaps.
    pub async fn search_by_embedding(
        &self,
        query: &[f32],
        top_k: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<SearchHit>> {
        let corpus = self.corpus.read().await;
        let neighbors = corpus.index().search(query, top_k)?;

        let mut hits = Vec::with_capacity(neighbors.len());
        for (i, (position, distance)) in neighbors.into_iter().enumerate() {
            let text = match corpus.documents().get(position) {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("Invalid index {position} found in search results: {err}");
                    continue;
                }
            };
            let score = similarity_score(distance);
            log::debug!(
                "Result {}: position {position}, distance {distance:.6}, score {score:.6}",
                i + 1
            );
            if score >= similarity_threshold {
                hits.push(SearchHit {
                    text: text.to_string(),
                    score,
                    rank: i + 1,
                });
            }
        }

        log::debug!("Found {} results above threshold", hits.len());
        Ok(hits)
    }

    /// Document text at `position`
    pub async fn document(&self, position: usize) -> Result<String> {
        let corpus = self.corpus.read().await;
        corpus.documents().get(position).map(ToString::to_string)
    }

    pub async fn stats(&self) -> StoreStats {
        let corpus = self.corpus.read().await;
        StoreStats {
            documents: corpus.documents().len(),
            vectors: corpus.index().len(),
            dimension: corpus.dimension(),
        }
    }

    /// Write the current corpus to disk, e.g. at shutdown or after a failed save.
    ///
    /// Saves share the staging files, so a flush queues behind writers like an
    /// append does and only then drops to the read side.
    pub async fn flush(&self) -> Result<()> {
        let corpus = self.corpus.write().await.downgrade();
        self.persistence
            .save(corpus.index(), corpus.documents())
            .await
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.embedder.embed(text).await.ok_or_else(|| {
            VectorStoreError::ProviderUnavailable(format!(
                "{} returned no embedding",
                self.embedder.name()
            ))
        })
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
