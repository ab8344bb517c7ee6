use formqa_core::config::{BackendKind, EmbedderKind, Settings};
use formqa_core::error::{FormqaError, Result};
use formqa_core::models::{Query, RowDocument};
use formqa_llm::{AzureChatGenerator, AzureEmbedder, Generator, HashingEmbedder, HostedClient};
use formqa_store::{MemoryDocumentStore, MemoryVectorStore};
use std::sync::Arc;

use crate::backend::{HostedBackend, LocalBackend, RetrievalBackend};
use crate::models::{IndexSummary, QaAnswer, QueryPlan, SourceReference};
use crate::postprocess::{clean_answer, export_records, extract_records};
use crate::prompt::assemble_prompt;

/// Question-answering pipeline over one retrieval backend
pub struct QaPipeline {
    backend: Box<dyn RetrievalBackend>,
    generator: Arc<dyn Generator>,
}

impl QaPipeline {
    /// Create a new pipeline
    pub fn new(backend: Box<dyn RetrievalBackend>, generator: Arc<dyn Generator>) -> Self {
        Self { backend, generator }
    }

    /// Wire the configured backend, embedder and generator
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.backend {
            BackendKind::Local => {
                let azure = settings.azure.as_ref().ok_or_else(|| FormqaError::ConfigMissing {
                    key: "azure".to_string(),
                })?;

                let backend: Box<dyn RetrievalBackend> = match settings.embedder {
                    EmbedderKind::Azure => Box::new(LocalBackend::new(
                        MemoryVectorStore::new(),
                        MemoryDocumentStore::new(),
                        AzureEmbedder::new(azure, settings.timeout)?,
                    )),
                    EmbedderKind::Hashing => Box::new(LocalBackend::new(
                        MemoryVectorStore::new(),
                        MemoryDocumentStore::new(),
                        HashingEmbedder::default(),
                    )),
                };
                let generator = Arc::new(AzureChatGenerator::new(azure, settings.timeout)?);

                Ok(Self::new(backend, generator))
            }
            BackendKind::Hosted => {
                let hosted = settings.hosted.as_ref().ok_or_else(|| FormqaError::ConfigMissing {
                    key: "hosted".to_string(),
                })?;

                let client = HostedClient::new(hosted, settings.timeout)?;
                Ok(Self::new(Box::new(HostedBackend::new(client.clone())), Arc::new(client)))
            }
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn delegates_retrieval(&self) -> bool {
        self.backend.delegates_retrieval()
    }

    /// Index (or upload) a sheet's row documents, replacing the previous set
    pub async fn build(&mut self, documents: &[RowDocument]) -> Result<IndexSummary> {
        if documents.is_empty() {
            return Err(FormqaError::empty("spreadsheet"));
        }
        self.backend.build(documents).await
    }

    /// Answer one question
    ///
    /// A structured reply that cannot be parsed or exported still returns
    /// `Ok`; the reason is carried in [`QaAnswer::export_error`].
    pub async fn ask(&self, plan: &QueryPlan) -> Result<QaAnswer> {
        let query = Query::new(plan.question.as_str())?;
        let mode = plan.resolved_mode();
        let delegated = self.backend.delegates_retrieval();

        let retrieved = if delegated {
            Vec::new()
        } else {
            self.backend.search(&query, plan.top_k.max(1)).await?
        };

        tracing::info!(
            backend = self.backend.name(),
            mode = %mode,
            retrieved = retrieved.len(),
            "Answering question"
        );

        let prompt = assemble_prompt(&query, &retrieved, mode, delegated);
        let raw = self.generator.generate(&prompt).await?;

        let sources = retrieved.into_iter().map(SourceReference::from).collect();
        let mut answer = QaAnswer::new(clean_answer(&raw), raw, mode, sources);

        if mode.is_structured() {
            let extracted = extract_records(&answer.raw_answer, plan.policy)
                .and_then(|records| export_records(&records).map(|exports| (records, exports)));

            match extracted {
                Ok((records, exports)) => {
                    tracing::info!(records = records.len(), "Extracted structured records");
                    answer.records = records;
                    answer.exports = exports;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Structured extraction failed");
                    answer.export_error = Some(e.to_string());
                }
            }
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use formqa_core::models::{ExtractionPolicy, TaskMode};
    use std::sync::Mutex;

    /// Generator returning a canned reply and recording the prompts it saw
    struct ScriptedGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn local_pipeline(generator: Arc<ScriptedGenerator>) -> QaPipeline {
        let backend = LocalBackend::new(
            MemoryVectorStore::new(),
            MemoryDocumentStore::new(),
            HashingEmbedder::default(),
        );
        QaPipeline::new(Box::new(backend), generator)
    }

    fn documents() -> Vec<RowDocument> {
        vec![
            RowDocument::new(0, "Form Number: 100\nForm Title: General Liability"),
            RowDocument::new(1, "Form Number: 200\nForm Title: Commercial Auto"),
        ]
    }

    #[tokio::test]
    async fn test_empty_question_makes_no_call() {
        let generator = ScriptedGenerator::new("unused");
        let mut pipeline = local_pipeline(generator.clone());
        pipeline.build(&documents()).await.unwrap();

        let err = pipeline.ask(&QueryPlan::new("   ")).await.unwrap_err();
        assert!(matches!(err, FormqaError::EmptyInput { .. }));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_before_build() {
        let pipeline = local_pipeline(ScriptedGenerator::new("unused"));
        let err = pipeline.ask(&QueryPlan::new("what is form 100?")).await.unwrap_err();
        assert!(matches!(err, FormqaError::IndexNotBuilt));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_sheet() {
        let mut pipeline = local_pipeline(ScriptedGenerator::new("unused"));
        assert!(matches!(pipeline.build(&[]).await, Err(FormqaError::EmptyInput { .. })));
    }

    #[tokio::test]
    async fn test_free_form_answer_is_cleaned() {
        let generator =
            ScriptedGenerator::new("Form 100 is <b>General Liability</b> 【1:0†source】.");
        let mut pipeline = local_pipeline(generator.clone());
        pipeline.build(&documents()).await.unwrap();

        let plan = QueryPlan::new("What is form 100?").with_top_k(1);
        let answer = pipeline.ask(&plan).await.unwrap();

        assert_eq!(answer.mode, TaskMode::FreeForm);
        assert_eq!(answer.answer, "Form 100 is General Liability .");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].row_index, 0);
        assert!(answer.records.is_empty());
        assert!(answer.export_error.is_none());

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Form Number: 100"));
        assert!(!prompts[0].contains("Form Number: 200"));
    }

    #[tokio::test]
    async fn test_structured_without_json_keeps_answer() {
        let generator = ScriptedGenerator::new("I could not find that form.");
        let mut pipeline = local_pipeline(generator);
        pipeline.build(&documents()).await.unwrap();

        let answer = pipeline.ask(&QueryPlan::new("generate data for form 999")).await.unwrap();

        assert_eq!(answer.mode, TaskMode::Structured);
        assert_eq!(answer.answer, "I could not find that form.");
        assert!(answer.exports.is_empty());
        assert!(answer.export_error.is_some());
    }

    #[tokio::test]
    async fn test_structured_all_policy() {
        let generator =
            ScriptedGenerator::new("{\"Formcode\": \"100\"}\n{\"Formcode\": \"200\"}");
        let mut pipeline = local_pipeline(generator);
        pipeline.build(&documents()).await.unwrap();

        let plan = QueryPlan::new("forms 100 and 200")
            .with_mode(TaskMode::Structured)
            .with_policy(ExtractionPolicy::All);
        let answer = pipeline.ask(&plan).await.unwrap();

        assert_eq!(answer.records.len(), 2);
        let names: Vec<_> = answer.exports.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["100.xlsx", "200.xlsx"]);
    }
}
