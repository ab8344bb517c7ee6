use formqa_core::formats::RecordExport;
use formqa_core::models::{DocumentId, ExtractedRecord, ExtractionPolicy, ScoredDocument, TaskMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of rows retrieved per question
pub const DEFAULT_TOP_K: usize = 5;

/// Query plan for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPlan {
    /// The user question
    pub question: String,

    /// Answer mode; detected from the question when not set
    pub mode: Option<TaskMode>,

    /// Number of rows to retrieve
    pub top_k: usize,

    /// How many JSON objects become records in structured mode
    pub policy: ExtractionPolicy,
}

impl QueryPlan {
    /// Create a new query plan
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            mode: None,
            top_k: DEFAULT_TOP_K,
            policy: ExtractionPolicy::default(),
        }
    }

    /// Force the answer mode
    pub fn with_mode(mut self, mode: TaskMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the number of top results
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the multi-object extraction policy
    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Mode the plan resolves to
    pub fn resolved_mode(&self) -> TaskMode {
        self.mode.unwrap_or_else(|| TaskMode::detect(&self.question))
    }
}

/// Reference to a retrieved spreadsheet row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    /// Document ID
    pub document_id: DocumentId,

    /// Data-row index in the uploaded sheet
    pub row_index: usize,

    /// Flattened row text
    pub excerpt: String,

    /// Cosine similarity to the question
    pub score: f32,
}

impl From<ScoredDocument> for SourceReference {
    fn from(hit: ScoredDocument) -> Self {
        Self {
            document_id: hit.document.id,
            row_index: hit.document.source_row_index,
            excerpt: hit.document.text,
            score: hit.score,
        }
    }
}

/// Answer to one question, with everything the caller may show or save
#[derive(Debug, Clone, Serialize)]
pub struct QaAnswer {
    /// Cleaned answer text
    pub answer: String,

    /// Reply exactly as the generator returned it
    pub raw_answer: String,

    /// Mode the question was answered in
    pub mode: TaskMode,

    /// Rows the answer was grounded on; empty when retrieval is delegated
    pub sources: Vec<SourceReference>,

    /// Records parsed from a structured reply
    pub records: Vec<ExtractedRecord>,

    /// One export per record
    pub exports: Vec<RecordExport>,

    /// Why extraction or export failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_error: Option<String>,
}

impl QaAnswer {
    /// Create a free-form answer
    pub fn new(
        answer: impl Into<String>,
        raw_answer: impl Into<String>,
        mode: TaskMode,
        sources: Vec<SourceReference>,
    ) -> Self {
        Self {
            answer: answer.into(),
            raw_answer: raw_answer.into(),
            mode,
            sources,
            records: Vec::new(),
            exports: Vec::new(),
            export_error: None,
        }
    }

    pub fn has_exports(&self) -> bool {
        !self.exports.is_empty()
    }
}

/// Result of building an index over a sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Backend name
    pub backend: String,

    /// Row documents indexed (or uploaded)
    pub documents_indexed: usize,

    /// Blank rows left out of the index
    pub blank_rows_skipped: usize,

    /// Embedding dimensionality; 0 for the hosted backend
    pub dimensions: usize,

    /// Embedder or store the index lives in
    pub location: String,

    /// Hosted service acknowledgement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use formqa_core::models::RowDocument;

    #[test]
    fn test_query_plan_builder() {
        let plan = QueryPlan::new("generate data for form 100")
            .with_top_k(3)
            .with_policy(ExtractionPolicy::All);

        assert_eq!(plan.top_k, 3);
        assert_eq!(plan.policy, ExtractionPolicy::All);
        assert_eq!(plan.resolved_mode(), TaskMode::Structured);

        let forced = plan.with_mode(TaskMode::FreeForm);
        assert_eq!(forced.resolved_mode(), TaskMode::FreeForm);
    }

    #[test]
    fn test_default_plan() {
        let plan = QueryPlan::new("what is form 100?");
        assert_eq!(plan.top_k, DEFAULT_TOP_K);
        assert_eq!(plan.policy, ExtractionPolicy::First);
        assert_eq!(plan.resolved_mode(), TaskMode::FreeForm);
    }

    #[test]
    fn test_source_reference_from_hit() {
        let hit = ScoredDocument { document: RowDocument::new(4, "Form Number: 100"), score: 0.75 };
        let source = SourceReference::from(hit);
        assert_eq!(source.row_index, 4);
        assert_eq!(source.document_id, DocumentId(4));
        assert_eq!(source.excerpt, "Form Number: 100");
    }
}
