use chrono::Utc;
use formqa_core::formats::{read_sheet_from_bytes, SUPPORTED_EXTENSIONS};
use formqa_core::processing::{corpus, flatten_sheet};
use formqa_core::FormqaError;
use std::path::Path;
use uuid::Uuid;

use crate::dto::SessionResponse;
use crate::error::ApiError;
use crate::state::{AppState, Session};

/// Service for turning an uploaded spreadsheet into the active session
pub struct UploadService;

impl UploadService {
    /// Read, flatten and index the spreadsheet, replacing the previous session
    ///
    /// The previous session stays usable until the new index is built.
    pub async fn upload(
        state: &AppState,
        file_name: &str,
        data: &[u8],
    ) -> Result<SessionResponse, ApiError> {
        check_extension(file_name)?;
        if data.is_empty() {
            return Err(FormqaError::empty("uploaded file").into());
        }

        let sheet = read_sheet_from_bytes(data)?;
        let documents = flatten_sheet(&sheet);

        let mut pipeline = state.new_pipeline()?;
        let summary = pipeline.build(&documents).await.map_err(|e| {
            tracing::error!(error = %e, file_name, "Failed to index spreadsheet");
            ApiError::from(e)
        })?;

        let session = Session {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            uploaded_at: Utc::now(),
            corpus: corpus(&documents),
            summary,
            documents,
            pipeline,
        };
        let response = SessionResponse::from(&session);

        state.replace_session(session).await;
        tracing::info!(
            session_id = %response.session_id,
            rows = response.rows,
            backend = %response.index.backend,
            "Session replaced"
        );

        Ok(response)
    }
}

fn check_extension(file_name: &str) -> Result<(), ApiError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Unsupported file format").with_details(format!(
            "'{}' is not one of: {}",
            file_name,
            SUPPORTED_EXTENSIONS.join(", ")
        )))
    }
}
