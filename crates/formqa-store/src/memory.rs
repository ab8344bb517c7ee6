//! In-memory storage implementations.
//!
//! The local backend holds one spreadsheet's worth of rows, so the index
//! lives in process memory and is rebuilt on every upload.

use async_trait::async_trait;
use formqa_core::error::Result;
use formqa_core::models::{DocumentId, Embedding, RowDocument, ScoredResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{DocumentStore, VectorStore};

/// In-memory implementation of VectorStore
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorStore {
    embeddings: Arc<RwLock<HashMap<DocumentId, Embedding>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn store_embeddings(&self, embeddings: &[Embedding]) -> Result<()> {
        let mut store = self.embeddings.write().await;
        for embedding in embeddings {
            store.insert(embedding.document_id, embedding.clone());
        }
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<ScoredResult>> {
        let embeddings = self.embeddings.read().await;

        let mut results: Vec<ScoredResult> = embeddings
            .values()
            .map(|embedding| ScoredResult {
                document_id: embedding.document_id,
                score: Self::cosine_similarity(query, &embedding.vector),
            })
            .collect();

        // Apply threshold filtering if specified
        if let Some(threshold) = threshold {
            results.retain(|r| r.score >= threshold);
        }

        // Best score first; ties keep row order so results are deterministic
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.document_id.cmp(&b.document_id))
        });

        results.truncate(k);

        tracing::trace!(hits = results.len(), k, "Similarity search");
        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        self.embeddings.write().await.clear();
        Ok(())
    }

    async fn dimensions(&self) -> Result<usize> {
        let embeddings = self.embeddings.read().await;
        Ok(embeddings.values().next().map(|e| e.vector.len()).unwrap_or(0))
    }
}

/// In-memory implementation of DocumentStore
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<BTreeMap<DocumentId, RowDocument>>>,
}

impl MemoryDocumentStore {
    /// Create a new in-memory document store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn store_documents(&self, documents: &[RowDocument]) -> Result<()> {
        let mut store = self.documents.write().await;
        for document in documents {
            store.insert(document.id, document.clone());
        }
        Ok(())
    }

    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<RowDocument>> {
        let documents = self.documents.read().await;
        Ok(ids.iter().filter_map(|id| documents.get(id).cloned()).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.documents.write().await.clear();
        Ok(())
    }
}
