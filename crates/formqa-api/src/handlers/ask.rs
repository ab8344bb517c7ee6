use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{AskRequest, AskResponse};
use crate::error::ApiError;
use crate::services::AskService;
use crate::state::AppState;

pub async fn handle_ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    tracing::info!(
        question = %request.question,
        mode = ?request.mode,
        top_k = ?request.top_k,
        "Processing ask request"
    );

    let answer = AskService::ask(&state, &request).await?;

    Ok(Json(AskResponse::from(answer)))
}
