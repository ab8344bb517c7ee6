//! LLM port definitions

use async_trait::async_trait;
use formqa_core::error::Result;

/// Port for embedding text into vector representations
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of texts
    ///
    /// # Arguments
    /// * `texts` - Slice of text strings to embed
    ///
    /// # Returns
    /// Vector of embedding vectors, one per input text, in input order
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the name/identifier of the embedding model
    fn model_name(&self) -> &str;
}

/// Port for text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply for a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the name/identifier of the generation model
    fn model_name(&self) -> &str;
}
