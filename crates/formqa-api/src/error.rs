use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use formqa_core::FormqaError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<FormqaError> for ApiError {
    fn from(err: FormqaError) -> Self {
        let details = err.to_string();
        match &err {
            FormqaError::Spreadsheet { .. } => Self::bad_request("Invalid spreadsheet"),
            FormqaError::EmptyInput { .. } => Self::bad_request("Empty input"),
            FormqaError::IndexNotBuilt => Self::conflict("Index not built"),
            FormqaError::Upstream { .. } | FormqaError::Transport { .. } => {
                Self::bad_gateway("Upstream service failed")
            }
            FormqaError::ConfigMissing { .. } | FormqaError::ConfigInvalid { .. } => {
                Self::internal("Server is not configured")
            }
            _ => Self::internal("Internal error"),
        }
        .with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FormqaError::Spreadsheet { reason: "bad".into() }, StatusCode::BAD_REQUEST),
            (FormqaError::empty("question"), StatusCode::BAD_REQUEST),
            (FormqaError::IndexNotBuilt, StatusCode::CONFLICT),
            (
                FormqaError::Upstream {
                    service: "azure-chat".into(),
                    status: 500,
                    body: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                FormqaError::Transport { service: "hosted-qa".into(), reason: "timeout".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (FormqaError::Export { reason: "disk".into() }, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_details_carry_the_error_text() {
        let err = ApiError::from(FormqaError::empty("question"));
        assert_eq!(err.details.as_deref(), Some("Nothing to do: question is empty"));
    }
}
