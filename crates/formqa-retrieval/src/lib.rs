//! FormQA Retrieval - Question answering over row documents
//!
//! This crate implements the retrieval use cases: building an index over
//! flattened rows (locally or in a hosted store), assembling prompts, calling
//! the generator and post-processing its reply into clean text and
//! exportable records.

pub mod backend;
pub mod models;
pub mod pipeline;
pub mod postprocess;
pub mod prompt;

pub use backend::{HostedBackend, LocalBackend, RetrievalBackend};
pub use models::{IndexSummary, QaAnswer, QueryPlan, SourceReference};
pub use pipeline::QaPipeline;
pub use postprocess::{clean_answer, extract_records, find_json_objects};
pub use prompt::assemble_prompt;
