use std::sync::Arc;

use axum::{extract::State, Json};
use formqa_core::FormqaError;

use crate::dto::SessionResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Which spreadsheet is loaded and how it was indexed
pub async fn session_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.session().read().await;
    let session = session.as_ref().ok_or(FormqaError::IndexNotBuilt)?;

    Ok(Json(SessionResponse::from(session)))
}
