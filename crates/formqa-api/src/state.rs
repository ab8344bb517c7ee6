use chrono::{DateTime, Utc};
use formqa_core::config::Settings;
use formqa_core::formats::RecordExport;
use formqa_core::models::RowDocument;
use formqa_core::Result;
use formqa_retrieval::{IndexSummary, QaPipeline};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Builds a fresh pipeline for each uploaded spreadsheet
pub type PipelineFactory = Arc<dyn Fn() -> Result<QaPipeline> + Send + Sync>;

/// The spreadsheet currently being asked about
pub struct Session {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub documents: Vec<RowDocument>,
    pub corpus: String,
    pub summary: IndexSummary,
    pub pipeline: QaPipeline,
}

pub struct AppState {
    pub top_k: usize,
    factory: PipelineFactory,
    session: RwLock<Option<Session>>,
    /// Workbooks from the most recent structured answer
    exports: RwLock<HashMap<String, RecordExport>>,
}

impl AppState {
    pub fn new(top_k: usize, factory: PipelineFactory) -> Self {
        Self {
            top_k,
            factory,
            session: RwLock::new(None),
            exports: RwLock::new(HashMap::new()),
        }
    }

    /// State wired from resolved settings
    pub fn from_settings(settings: Settings) -> Self {
        let top_k = settings.top_k;
        let factory: PipelineFactory = Arc::new(move || QaPipeline::from_settings(&settings));
        Self::new(top_k, factory)
    }

    pub fn new_pipeline(&self) -> Result<QaPipeline> {
        (self.factory)()
    }

    pub fn session(&self) -> &RwLock<Option<Session>> {
        &self.session
    }

    /// Replace the current session; exports from the previous one are dropped
    pub async fn replace_session(&self, session: Session) {
        let mut current = self.session.write().await;
        self.exports.write().await.clear();
        *current = Some(session);
    }

    /// Replace the downloadable workbooks with those of the latest answer
    pub async fn store_exports(&self, exports: &[RecordExport]) {
        let mut stored = self.exports.write().await;
        stored.clear();
        for export in exports {
            stored.insert(export.file_name.clone(), export.clone());
        }
    }

    pub async fn export(&self, name: &str) -> Option<RecordExport> {
        self.exports.read().await.get(name).cloned()
    }
}
