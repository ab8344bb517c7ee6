//! Offline bag-of-words embedder using the hashing trick
//!
//! Tokens are lowercase alphanumeric runs. Each token is hashed (FNV-1a) into
//! one of `dimensions` buckets with a hash-derived sign, and the vector is
//! L2-normalised. Rows sharing rare tokens such as form numbers end up close
//! under cosine similarity, which is enough for small sheets and for tests.

use async_trait::async_trait;
use formqa_core::error::{FormqaError, Result};

use crate::ports::Embedder;

pub const DEFAULT_HASHING_DIMENSIONS: usize = 512;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(FormqaError::ConfigInvalid {
                key: "embedder".to_string(),
                reason: "hashing embedder needs at least one dimension".to_string(),
            });
        }
        Ok(Self { dimensions, name: format!("hashing-{}", dimensions) })
    }

    /// Embed one text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_HASHING_DIMENSIONS,
            name: format!("hashing-{}", DEFAULT_HASHING_DIMENSIONS),
        }
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashingEmbedder::default();
        assert_eq!(embedder.embed_text("Form Number: 100"), embedder.embed_text("form number 100"));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8).unwrap();
        assert_eq!(embedder.embed_text("  ::  "), vec![0.0; 8]);
    }

    #[test]
    fn test_shared_rare_token_ranks_first() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed_text("generate data for form 100");
        let row_100 = embedder.embed_text("Form Number: 100\nForm Title: General Liability");
        let row_200 = embedder.embed_text("Form Number: 200\nForm Title: Commercial Auto");

        assert!(cosine(&query, &row_100) > cosine(&query, &row_200));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[tokio::test]
    async fn test_embed_batch_matches_dimensions() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let vectors = embedder.embed(&["a b", "c"]).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 64));
        assert_eq!(embedder.model_name(), "hashing-64");
    }

    proptest! {
        #[test]
        fn prop_non_empty_vectors_are_unit_length(text in "[a-z0-9 ]{1,60}") {
            let embedder = HashingEmbedder::default();
            let vector = embedder.embed_text(&text);
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-4);
        }
    }
}
