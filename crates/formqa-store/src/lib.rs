//! FormQA Store - Storage ports and adapters
//!
//! This crate defines the vector and document storage ports used by the
//! local retrieval backend, with in-memory adapter implementations.

pub mod memory;
pub mod ports;

pub use memory::{MemoryDocumentStore, MemoryVectorStore};
pub use ports::{DocumentStore, VectorStore};
