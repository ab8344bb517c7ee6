use std::sync::Arc;

use axum::{extract::Multipart, extract::State, Json};

use crate::dto::SessionResponse;
use crate::error::ApiError;
use crate::services::UploadService;
use crate::state::AppState;

pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SessionResponse>, ApiError> {
    let (file_name, data) = extract_file(&mut multipart).await?;

    tracing::info!(file_name = %file_name, size = data.len(), "Received spreadsheet");

    let session = UploadService::upload(&state, &file_name, &data).await?;

    Ok(Json(session))
}

async fn extract_file(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::bad_request("Failed to parse multipart form").with_details(e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiError::bad_request("Failed to read file data").with_details(e.to_string())
            })?;
            return Ok((file_name, data.to_vec()));
        }
    }

    Err(ApiError::bad_request("No file provided")
        .with_details("Expected a 'file' field in the multipart form"))
}
