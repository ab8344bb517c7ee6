use async_trait::async_trait;
use formqa_core::error::Result;
use formqa_core::models::{DocumentId, Embedding, RowDocument, ScoredResult};

/// Port for vector storage and similarity search
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store embeddings, replacing any with the same document ID
    async fn store_embeddings(&self, embeddings: &[Embedding]) -> Result<()>;

    /// Perform similarity search
    /// Returns the top k most similar embeddings to the query vector, best first
    /// If threshold is provided, only returns results with similarity >= threshold
    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<ScoredResult>>;

    /// Remove every stored embedding
    async fn clear(&self) -> Result<()>;

    /// Get the dimensionality of stored vectors (0 when empty)
    async fn dimensions(&self) -> Result<usize>;
}

/// Port for row document storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store row documents
    async fn store_documents(&self, documents: &[RowDocument]) -> Result<()>;

    /// Retrieve documents by IDs, in the order requested; unknown IDs are skipped
    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<RowDocument>>;

    /// Remove every stored document
    async fn clear(&self) -> Result<()>;
}
