use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use formqa_core::FormqaError;

use crate::error::ApiError;
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn download_export(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let export = state
        .export(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Export not found").with_details(name.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&export.file_name)),
        ],
        export.bytes,
    ))
}

/// The flattened corpus of the active session, as uploaded to the hosted store
pub async fn download_corpus(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session().read().await;
    let session = session.as_ref().ok_or(FormqaError::IndexNotBuilt)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment("converted.txt")),
        ],
        session.corpus.clone(),
    ))
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', ""))
}
