use crate::error::{Result, VectorStoreError};

/// Ordered document texts; position `i` belongs to vector `i` of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStore {
    documents: Vec<String>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn from_documents(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// Append a document and return its position.
    pub fn append(&mut self, text: impl Into<String>) -> usize {
        self.documents.push(text.into());
        self.documents.len() - 1
    }

    pub fn get(&self, position: usize) -> Result<&str> {
        self.documents
            .get(position)
            .map(String::as_str)
            .ok_or(VectorStoreError::OutOfRange {
                position,
                len: self.documents.len(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(String::as_str)
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.documents
    }
}
