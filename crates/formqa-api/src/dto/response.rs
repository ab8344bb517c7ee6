use chrono::{DateTime, Utc};
use formqa_core::models::{ExtractedRecord, TaskMode};
use formqa_retrieval::{IndexSummary, QaAnswer, SourceReference};
use serde::Serialize;
use uuid::Uuid;

use crate::state::Session;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok".to_string(), version: env!("CARGO_PKG_VERSION").to_string() }
    }
}

/// The active session, returned by upload and the session status route
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub rows: usize,
    pub index: IndexSummary,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            file_name: session.file_name.clone(),
            uploaded_at: session.uploaded_at,
            rows: session.documents.len(),
            index: session.summary.clone(),
        }
    }
}

/// Download link for an exported record workbook
#[derive(Debug, Serialize)]
pub struct ExportLink {
    pub file_name: String,
    pub url: String,
}

/// Ask response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub raw_answer: String,
    pub mode: TaskMode,
    pub sources: Vec<SourceReference>,
    pub records: Vec<ExtractedRecord>,
    pub export_error: Option<String>,
    pub exports: Vec<ExportLink>,
}

impl From<QaAnswer> for AskResponse {
    fn from(answer: QaAnswer) -> Self {
        let exports = answer
            .exports
            .iter()
            .map(|e| ExportLink {
                file_name: e.file_name.clone(),
                url: format!("/api/v1/export/{}", e.file_name),
            })
            .collect();

        Self {
            answer: answer.answer,
            raw_answer: answer.raw_answer,
            mode: answer.mode,
            sources: answer.sources,
            records: answer.records,
            export_error: answer.export_error,
            exports,
        }
    }
}
