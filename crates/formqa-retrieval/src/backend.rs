//! Retrieval backends
//!
//! A backend owns the index over one sheet's row documents. The local
//! backend embeds rows into an in-process vector store; the hosted backend
//! uploads the corpus and lets the remote QA endpoint retrieve.

use async_trait::async_trait;
use formqa_core::error::{FormqaError, Result};
use formqa_core::models::{Embedding, Query, RowDocument, ScoredDocument};
use formqa_core::processing::corpus;
use formqa_llm::hosted::HostedClient;
use formqa_llm::ports::Embedder;
use formqa_store::ports::{DocumentStore, VectorStore};
use std::collections::HashMap;

use crate::models::IndexSummary;

/// Port for building and searching an index over row documents
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Replace the index contents with these documents
    async fn build(&mut self, documents: &[RowDocument]) -> Result<IndexSummary>;

    /// The k most similar documents to the query, best first
    async fn search(&self, query: &Query, k: usize) -> Result<Vec<ScoredDocument>>;

    /// Whether retrieval happens inside the generator call
    fn delegates_retrieval(&self) -> bool;

    fn name(&self) -> &str;
}

/// Embedding index held in local vector and document stores
pub struct LocalBackend<V, D, E>
where
    V: VectorStore,
    D: DocumentStore,
    E: Embedder,
{
    vector_store: V,
    document_store: D,
    embedder: E,
    batch_size: usize,
    built: bool,
}

impl<V, D, E> LocalBackend<V, D, E>
where
    V: VectorStore,
    D: DocumentStore,
    E: Embedder,
{
    /// Create a new local backend
    pub fn new(vector_store: V, document_store: D, embedder: E) -> Self {
        Self { vector_store, document_store, embedder, batch_size: 32, built: false }
    }

    /// Set the batch size for embedding generation
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn is_built(&self) -> bool {
        self.built
    }
}

#[async_trait]
impl<V, D, E> RetrievalBackend for LocalBackend<V, D, E>
where
    V: VectorStore,
    D: DocumentStore,
    E: Embedder,
{
    async fn build(&mut self, documents: &[RowDocument]) -> Result<IndexSummary> {
        self.built = false;
        self.vector_store.clear().await?;
        self.document_store.clear().await?;

        let indexable: Vec<&RowDocument> = documents.iter().filter(|d| !d.is_empty()).collect();
        if indexable.is_empty() {
            return Err(FormqaError::empty("spreadsheet rows"));
        }

        for batch in indexable.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|d| d.text.as_str()).collect();
            let vectors = self.embedder.embed(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(FormqaError::Upstream {
                    service: self.embedder.model_name().to_string(),
                    status: 200,
                    body: format!("expected {} embeddings, got {}", batch.len(), vectors.len()),
                });
            }

            let embeddings: Vec<Embedding> = batch
                .iter()
                .zip(vectors)
                .map(|(doc, vector)| Embedding::new(doc.id, vector))
                .collect();
            self.vector_store.store_embeddings(&embeddings).await?;
        }

        let stored: Vec<RowDocument> = indexable.iter().map(|d| (*d).clone()).collect();
        self.document_store.store_documents(&stored).await?;
        self.built = true;

        let summary = IndexSummary {
            backend: self.name().to_string(),
            documents_indexed: stored.len(),
            blank_rows_skipped: documents.len() - stored.len(),
            dimensions: self.vector_store.dimensions().await?,
            location: self.embedder.model_name().to_string(),
            acknowledgement: None,
        };

        tracing::info!(
            documents = summary.documents_indexed,
            blank_rows = summary.blank_rows_skipped,
            dimensions = summary.dimensions,
            embedder = %summary.location,
            "Built local index"
        );

        Ok(summary)
    }

    async fn search(&self, query: &Query, k: usize) -> Result<Vec<ScoredDocument>> {
        if !self.built {
            return Err(FormqaError::IndexNotBuilt);
        }

        let query_vector = self
            .embedder
            .embed(&[query.text.as_str()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FormqaError::Upstream {
                service: self.embedder.model_name().to_string(),
                status: 200,
                body: "no embedding returned for the question".to_string(),
            })?;

        let hits = self.vector_store.similarity_search(&query_vector, k, None).await?;
        let ids: Vec<_> = hits.iter().map(|hit| hit.document_id).collect();

        let mut documents: HashMap<_, _> = self
            .document_store
            .get_documents(&ids)
            .await?
            .into_iter()
            .map(|doc| (doc.id, doc))
            .collect();

        let results: Vec<ScoredDocument> = hits
            .iter()
            .filter_map(|hit| {
                documents
                    .remove(&hit.document_id)
                    .map(|document| ScoredDocument { document, score: hit.score })
            })
            .collect();

        tracing::debug!(k, hits = results.len(), "Searched local index");
        Ok(results)
    }

    fn delegates_retrieval(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Corpus kept in the hosted vector store
pub struct HostedBackend {
    client: HostedClient,
}

impl HostedBackend {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RetrievalBackend for HostedBackend {
    async fn build(&mut self, documents: &[RowDocument]) -> Result<IndexSummary> {
        let text = corpus(documents);
        if text.is_empty() {
            return Err(FormqaError::empty("spreadsheet rows"));
        }

        let receipt = self.client.upload(&text).await?;
        let uploaded = documents.iter().filter(|d| !d.is_empty()).count();

        tracing::info!(store_id = %receipt.store_id, documents = uploaded, "Uploaded corpus");

        Ok(IndexSummary {
            backend: self.name().to_string(),
            documents_indexed: uploaded,
            blank_rows_skipped: documents.len() - uploaded,
            dimensions: 0,
            location: receipt.store_id,
            acknowledgement: Some(receipt.acknowledgement),
        })
    }

    async fn search(&self, _query: &Query, _k: usize) -> Result<Vec<ScoredDocument>> {
        Ok(Vec::new())
    }

    fn delegates_retrieval(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "hosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formqa_core::models::DocumentId;
    use formqa_llm::HashingEmbedder;
    use formqa_store::{MemoryDocumentStore, MemoryVectorStore};

    fn backend() -> LocalBackend<MemoryVectorStore, MemoryDocumentStore, HashingEmbedder> {
        LocalBackend::new(
            MemoryVectorStore::new(),
            MemoryDocumentStore::new(),
            HashingEmbedder::default(),
        )
    }

    fn documents() -> Vec<RowDocument> {
        vec![
            RowDocument::new(0, "Form Number: 100\nForm Title: General Liability"),
            RowDocument::new(1, ""),
            RowDocument::new(2, "Form Number: 200\nForm Title: Commercial Auto"),
        ]
    }

    #[tokio::test]
    async fn test_search_before_build() {
        let backend = backend();
        let query = Query::new("form 100").unwrap();
        let err = backend.search(&query, 5).await.unwrap_err();
        assert!(matches!(err, FormqaError::IndexNotBuilt));
    }

    #[tokio::test]
    async fn test_build_skips_blank_rows() {
        let mut backend = backend().with_batch_size(1);
        let summary = backend.build(&documents()).await.unwrap();

        assert_eq!(summary.backend, "local");
        assert_eq!(summary.documents_indexed, 2);
        assert_eq!(summary.blank_rows_skipped, 1);
        assert_eq!(summary.dimensions, 512);
        assert!(backend.is_built());
    }

    #[tokio::test]
    async fn test_search_ranks_matching_row_first() {
        let mut backend = backend();
        backend.build(&documents()).await.unwrap();

        let query = Query::new("tell me about form 200").unwrap();
        let hits = backend.search(&query, 5).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, DocumentId(2));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_rows() {
        let mut backend = backend();
        backend.build(&documents()).await.unwrap();
        backend.build(&[RowDocument::new(0, "Form Number: 900")]).await.unwrap();

        let query = Query::new("form 100").unwrap();
        let hits = backend.search(&query, 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.text, "Form Number: 900");
    }

    #[tokio::test]
    async fn test_all_blank_rows_rejected() {
        let mut backend = backend();
        let err = backend.build(&[RowDocument::new(0, "")]).await.unwrap_err();
        assert!(matches!(err, FormqaError::EmptyInput { .. }));
        assert!(!backend.is_built());
    }
}
