use crate::document_store::DocumentStore;
use crate::error::{Result, VectorStoreError};
use crate::vector_index::VectorIndex;

/// The aligned pair of vector index and document store.
///
/// Every mutation goes through [`Corpus::append`], which touches both halves
/// or neither, so `index.len() == documents.len()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    index: VectorIndex,
    documents: DocumentStore,
}

impl Corpus {
    #[must_use]
    pub fn empty(dimension: usize) -> Self {
        Self {
            index: VectorIndex::new(dimension),
            documents: DocumentStore::new(),
        }
    }

    /// Pair an index with a store, refusing halves that disagree on size.
    pub fn from_parts(index: VectorIndex, documents: DocumentStore) -> Result<Self> {
        if index.len() != documents.len() {
            return Err(VectorStoreError::CorruptSnapshot(format!(
                "index holds {} vectors but store holds {} documents",
                index.len(),
                documents.len()
            )));
        }
        Ok(Self { index, documents })
    }

    #[must_use]
    pub fn into_parts(self) -> (VectorIndex, DocumentStore) {
        (self.index, self.documents)
    }

    /// Append one document with its embedding. Dimension is checked before
    /// either structure is modified.
    pub fn append(&mut self, text: impl Into<String>, embedding: &[f32]) -> Result<usize> {
        self.index.check_dimension(embedding)?;
        let position = self.index.add(embedding)?;
        let stored = self.documents.append(text);
        debug_assert_eq!(position, stored);
        Ok(position)
    }

    #[must_use]
    pub const fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub const fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_halves_aligned() {
        let mut corpus = Corpus::empty(2);
        assert_eq!(corpus.append("a", &[0.0, 1.0]).unwrap(), 0);
        assert_eq!(corpus.append("b", &[1.0, 0.0]).unwrap(), 1);
        assert_eq!(corpus.index().len(), corpus.documents().len());
    }

    #[test]
    fn failed_append_changes_nothing() {
        let mut corpus = Corpus::empty(2);
        corpus.append("a", &[0.0, 1.0]).unwrap();
        let before = corpus.clone();

        let err = corpus.append("b", &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
        assert_eq!(corpus, before);
    }

    #[test]
    fn from_parts_rejects_mismatched_sizes() {
        let mut index = VectorIndex::new(1);
        index.add(&[1.0]).unwrap();
        let result = Corpus::from_parts(index, DocumentStore::new());
        assert!(matches!(result, Err(VectorStoreError::CorruptSnapshot(_))));
    }
}
