//! Paired on-disk snapshot of the vector index and the document store.
//!
//! Layout under the data directory:
//!
//! ```text
//! vectors.bin     "DQV1" | dimension: u32 LE | count: u64 LE | count * dimension f32 LE
//! documents.json  {"schema_version": 1, "documents": ["...", ...]}
//! ```
//!
//! Loading fails open: a missing, unreadable or inconsistent snapshot yields an
//! empty corpus instead of an error. This trades the stored documents for
//! availability, so deployments that care about the corpus must back up the
//! data directory independently.

use crate::config::StoreConfig;
use crate::corpus::Corpus;
use crate::document_store::DocumentStore;
use crate::error::{Result, VectorStoreError};
use crate::paths::staging_path;
use crate::vector_index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const INDEX_MAGIC: &[u8; 4] = b"DQV1";
const INDEX_HEADER_LEN: usize = 16;

pub const DOCUMENTS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct PersistedDocuments {
    schema_version: u32,
    documents: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PersistedDocumentsRef<'a> {
    schema_version: u32,
    documents: &'a [String],
}

/// Owns translation between the in-memory corpus and its two snapshot files.
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    data_dir: PathBuf,
    index_path: PathBuf,
    documents_path: PathBuf,
    dimension: usize,
}

impl PersistenceManager {
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            index_path: config.index_path(),
            documents_path: config.documents_path(),
            dimension: config.dimension,
        }
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[must_use]
    pub fn documents_path(&self) -> &Path {
        &self.documents_path
    }

    /// Load the snapshot, or an empty corpus if there is nothing usable.
    ///
    /// Never returns one half without the other.
    pub async fn load(&self) -> Corpus {
        match self.try_load().await {
            Ok(Some(corpus)) if corpus.is_empty() => {
                log::warn!(
                    "Existing snapshot in {:?} is empty, starting with an empty corpus",
                    self.data_dir
                );
                Corpus::empty(self.dimension)
            }
            Ok(Some(corpus)) => {
                log::info!(
                    "Loaded snapshot with {} vectors and {} documents from {:?}",
                    corpus.index().len(),
                    corpus.documents().len(),
                    self.data_dir
                );
                corpus
            }
            Ok(None) => {
                log::info!(
                    "Snapshot files not found in {:?}, starting with an empty corpus",
                    self.data_dir
                );
                Corpus::empty(self.dimension)
            }
            Err(err) => {
                log::error!(
                    "Discarding unusable snapshot in {:?} and starting with an empty corpus: {err}",
                    self.data_dir
                );
                Corpus::empty(self.dimension)
            }
        }
    }

    /// Strict load: `Ok(None)` when either file is absent, an error for any
    /// decoding failure or size disagreement.
    pub async fn try_load(&self) -> Result<Option<Corpus>> {
        let index_exists = tokio::fs::try_exists(&self.index_path).await?;
        let documents_exist = tokio::fs::try_exists(&self.documents_path).await?;
        if !index_exists || !documents_exist {
            return Ok(None);
        }

        let index_bytes = tokio::fs::read(&self.index_path).await?;
        let index = decode_index(&index_bytes, self.dimension)?;

        let documents_bytes = tokio::fs::read(&self.documents_path).await?;
        let documents = decode_documents(&documents_bytes)?;

        Corpus::from_parts(index, documents).map(Some)
    }

    /// Write both files. Each is staged next to its target and renamed into
    /// place only after both staged copies are on disk.
    pub async fn save(&self, index: &VectorIndex, documents: &DocumentStore) -> Result<()> {
        if index.len() != documents.len() {
            return Err(VectorStoreError::Persist(format!(
                "refusing to save {} vectors with {} documents",
                index.len(),
                documents.len()
            )));
        }
        if index.dimension() != self.dimension {
            return Err(VectorStoreError::Persist(format!(
                "index dimension {} does not match configured dimension {}",
                index.dimension(),
                self.dimension
            )));
        }

        log::debug!(
            "Saving {} vectors and {} documents to {:?}",
            index.len(),
            documents.len(),
            self.data_dir
        );

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|err| persist_error(&self.data_dir, &err))?;

        let index_bytes = encode_index(index);
        let documents_bytes = encode_documents(documents)?;

        let staged_index = write_staged(&self.index_path, &index_bytes).await?;
        let staged_documents = match write_staged(&self.documents_path, &documents_bytes).await {
            Ok(path) => path,
            Err(err) => {
                let _ = tokio::fs::remove_file(&staged_index).await;
                return Err(err);
            }
        };

        if let Err(err) = tokio::fs::rename(&staged_index, &self.index_path).await {
            let _ = tokio::fs::remove_file(&staged_index).await;
            let _ = tokio::fs::remove_file(&staged_documents).await;
            return Err(persist_error(&self.index_path, &err));
        }
        if let Err(err) = tokio::fs::rename(&staged_documents, &self.documents_path).await {
            let _ = tokio::fs::remove_file(&staged_documents).await;
            return Err(VectorStoreError::Persist(format!(
                "{} was replaced but {} was not ({err}); the snapshot is now inconsistent",
                self.index_path.display(),
                self.documents_path.display()
            )));
        }

        log::info!(
            "Saved snapshot with {} vectors and {} documents",
            index.len(),
            documents.len()
        );
        Ok(())
    }
}

async fn write_staged(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let staged = staging_path(path);
    let write = async {
        let mut file = tokio::fs::File::create(&staged).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok::<(), std::io::Error>(())
    };
    if let Err(err) = write.await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(persist_error(&staged, &err));
    }
    Ok(staged)
}

fn persist_error(path: &Path, err: &std::io::Error) -> VectorStoreError {
    VectorStoreError::Persist(format!("{}: {err}", path.display()))
}

fn encode_index(index: &VectorIndex) -> Vec<u8> {
    let flat = index.as_flat();
    let mut out = Vec::with_capacity(INDEX_HEADER_LEN + flat.len() * 4);
    out.extend_from_slice(INDEX_MAGIC);
    #[allow(clippy::cast_possible_truncation)]
    let dim = index.dimension() as u32;
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&(index.len() as u64).to_le_bytes());
    for v in flat {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn decode_index(bytes: &[u8], expected_dimension: usize) -> Result<VectorIndex> {
    if bytes.len() < INDEX_HEADER_LEN || &bytes[0..4] != INDEX_MAGIC {
        return Err(VectorStoreError::CorruptSnapshot(
            "vector file has no valid header".to_string(),
        ));
    }
    let dim = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if dim != expected_dimension {
        return Err(VectorStoreError::CorruptSnapshot(format!(
            "vector file has dimension {dim}, expected {expected_dimension}"
        )));
    }
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&bytes[8..16]);
    let count = usize::try_from(u64::from_le_bytes(count_bytes)).map_err(|_| {
        VectorStoreError::CorruptSnapshot("vector count does not fit in memory".to_string())
    })?;

    let expected_len = count
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(INDEX_HEADER_LEN));
    if expected_len != Some(bytes.len()) {
        return Err(VectorStoreError::CorruptSnapshot(format!(
            "vector file is {} bytes, header promises {count} vectors of dimension {dim}",
            bytes.len()
        )));
    }

    let data = bytes[INDEX_HEADER_LEN..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    VectorIndex::from_flat(dim, data)
}

fn encode_documents(documents: &DocumentStore) -> Result<Vec<u8>> {
    let persisted = PersistedDocumentsRef {
        schema_version: DOCUMENTS_SCHEMA_VERSION,
        documents: documents.as_slice(),
    };
    serde_json::to_vec(&persisted).map_err(|err| VectorStoreError::Persist(err.to_string()))
}

fn decode_documents(bytes: &[u8]) -> Result<DocumentStore> {
    let persisted: PersistedDocuments = serde_json::from_slice(bytes)
        .map_err(|err| VectorStoreError::CorruptSnapshot(format!("document file: {err}")))?;
    if persisted.schema_version != DOCUMENTS_SCHEMA_VERSION {
        return Err(VectorStoreError::CorruptSnapshot(format!(
            "Unsupported document schema_version {} (expected {DOCUMENTS_SCHEMA_VERSION})",
            persisted.schema_version
        )));
    }
    Ok(DocumentStore::from_documents(persisted.documents))
}
