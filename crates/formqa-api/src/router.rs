use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/upload", post(handlers::handle_upload))
        .route("/api/v1/session", get(handlers::session_status))
        .route("/api/v1/ask", post(handlers::handle_ask))
        .route("/api/v1/export/{name}", get(handlers::download_export))
        .route("/api/v1/corpus", get(handlers::download_corpus))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
