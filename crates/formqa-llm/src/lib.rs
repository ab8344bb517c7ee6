//! FormQA LLM - Embedding and generation ports
//!
//! This crate defines the ports for embedding and text generation, along
//! with the Azure OpenAI adapters, the hosted vector-store client and an
//! offline hashing embedder.

pub mod azure;
pub mod hashing;
pub mod hosted;
mod http;
pub mod ports;

// Re-export main types
pub use azure::{AzureChatGenerator, AzureEmbedder};
pub use hashing::HashingEmbedder;
pub use hosted::{HostedClient, UploadReceipt};
pub use ports::{Embedder, Generator};
