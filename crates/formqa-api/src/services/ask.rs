use formqa_core::models::{ExtractionPolicy, TaskMode};
use formqa_core::FormqaError;
use formqa_retrieval::{QaAnswer, QueryPlan};

use crate::dto::AskRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Service for answering questions against the active session
pub struct AskService;

impl AskService {
    pub async fn ask(state: &AppState, request: &AskRequest) -> Result<QaAnswer, ApiError> {
        let plan = Self::plan(state, request)?;

        let session = state.session().read().await;
        let session = session.as_ref().ok_or(FormqaError::IndexNotBuilt)?;

        let answer = session.pipeline.ask(&plan).await.map_err(|e| {
            tracing::error!(error = %e, "Question failed");
            ApiError::from(e)
        })?;

        state.store_exports(&answer.exports).await;
        Ok(answer)
    }

    fn plan(state: &AppState, request: &AskRequest) -> Result<QueryPlan, ApiError> {
        let mut plan = QueryPlan::new(request.question.as_str())
            .with_top_k(request.top_k.unwrap_or(state.top_k))
            .with_policy(if request.all_records {
                ExtractionPolicy::All
            } else {
                ExtractionPolicy::First
            });

        match request.mode.as_deref().map(str::trim) {
            None | Some("") | Some("auto") => {}
            Some(mode) => {
                let mode: TaskMode = mode.parse().map_err(|e: FormqaError| {
                    ApiError::bad_request("Invalid mode").with_details(e.to_string())
                })?;
                plan = plan.with_mode(mode);
            }
        }

        Ok(plan)
    }
}
