use formqa_core::config::ConfigSource;
use formqa_retrieval::{IndexSummary, QaAnswer};
use serde::Serialize;
use tabled::Tabled;

/// Output for convert command
#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub input: String,
    pub output: String,
    pub rows: usize,
    pub blank_rows: usize,
    pub bytes: usize,
}

/// Output for upload command
#[derive(Debug, Serialize)]
pub struct UploadOutput {
    pub input: String,
    pub store_id: String,
    pub documents_uploaded: usize,
    pub blank_rows_skipped: usize,
    pub acknowledgement: Option<serde_json::Value>,
}

impl UploadOutput {
    pub fn new(input: String, summary: IndexSummary) -> Self {
        Self {
            input,
            store_id: summary.location,
            documents_uploaded: summary.documents_indexed,
            blank_rows_skipped: summary.blank_rows_skipped,
            acknowledgement: summary.acknowledgement,
        }
    }
}

/// Output for one answered question
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub question: String,
    pub backend: String,
    #[serde(flatten)]
    pub answer: QaAnswer,
    /// Paths the exported workbooks were written to
    pub written: Vec<String>,
}

/// Table row for a retrieved source
#[derive(Debug, Serialize, Tabled)]
pub struct SourceRow {
    #[tabled(rename = "Row")]
    pub row: usize,
    #[tabled(rename = "Score")]
    pub score: String,
    #[tabled(rename = "Excerpt")]
    pub excerpt: String,
}

/// Output for config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigEntry {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: source.to_string() }
    }
}
