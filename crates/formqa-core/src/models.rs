pub mod document;
pub mod query;
pub mod record;
pub mod sheet;

pub use document::{DocumentId, Embedding, RowDocument, ScoredDocument, ScoredResult};
pub use query::{ExtractionPolicy, Query, TaskMode};
pub use record::{ExtractedRecord, RecordField};
pub use sheet::{Cell, Sheet, TableRow};
