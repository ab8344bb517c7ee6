use serde::{Deserialize, Serialize};

/// Unique identifier for a row document
///
/// Row documents are keyed by their 0-based data-row index in the uploaded
/// sheet, so the identifier is stable for the lifetime of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// One spreadsheet row flattened into retrievable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDocument {
    /// Unique identifier
    pub id: DocumentId,

    /// Flattened "column: value" text
    pub text: String,

    /// Data-row index in the source sheet (header row excluded)
    pub source_row_index: usize,
}

impl RowDocument {
    pub fn new(source_row_index: usize, text: impl Into<String>) -> Self {
        Self {
            id: DocumentId(source_row_index as u64),
            text: text.into(),
            source_row_index,
        }
    }

    /// A row whose cells were all blank
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Embedding vector for a row document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    /// Associated document ID
    pub document_id: DocumentId,

    /// Embedding vector
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(document_id: DocumentId, vector: Vec<f32>) -> Self {
        Self { document_id, vector }
    }
}

/// Similarity hit returned by a vector store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub document_id: DocumentId,
    pub score: f32,
}

/// A retrieved row document with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: RowDocument,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_document_id_follows_row_index() {
        let doc = RowDocument::new(7, "Form Number: 100");
        assert_eq!(doc.id, DocumentId(7));
        assert_eq!(doc.source_row_index, 7);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_blank_row_document_is_empty() {
        assert!(RowDocument::new(0, "").is_empty());
        assert!(RowDocument::new(0, "  \n ").is_empty());
    }
}
