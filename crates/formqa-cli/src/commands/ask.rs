use crate::cli::AskArgs;
use crate::config_loader::resolve_settings;
use crate::errors;
use crate::interactive::prompt_question;
use crate::output::OutputWriter;
use crate::output_types::{AskOutput, SourceRow};
use crate::progress::with_spinner;
use anyhow::{Context, Result};
use formqa_core::config::CliConfigOverrides;
use formqa_core::formats::{read_sheet, validate_spreadsheet_path};
use formqa_core::models::{ExtractionPolicy, Query};
use formqa_core::processing::flatten_sheet;
use formqa_retrieval::{IndexSummary, QaAnswer, QaPipeline, QueryPlan};
use std::path::Path;

const EXCERPT_WIDTH: usize = 72;

pub async fn execute(
    args: AskArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    validate_spreadsheet_path(&args.path)?;

    // Rejected here so a blank question never triggers an upload or embedding call
    if let Some(ref question) = args.question {
        Query::new(question.as_str())?;
    }

    let overrides = CliConfigOverrides {
        top_k: args.top_k.or(overrides.top_k),
        store_id: args.store_id.clone().or(overrides.store_id),
        ..overrides
    };
    let settings = resolve_settings(config_path, overrides)?;
    let mut pipeline = QaPipeline::from_settings(&settings)?;

    let sheet = read_sheet(&args.path)?;
    let documents = flatten_sheet(&sheet);

    if args.skip_upload && pipeline.delegates_retrieval() {
        output.info("Reusing the corpus already in the hosted store");
    } else {
        if args.skip_upload {
            output.warning("--skip-upload only applies to the hosted backend; building the index");
        }
        let message = if pipeline.delegates_retrieval() {
            "Uploading corpus..."
        } else {
            "Building index..."
        };
        with_spinner(message, output.is_json(), pipeline.build(&documents), |s: &IndexSummary| {
            format!("Indexed {} rows ({})", s.documents_indexed, s.location)
        })
        .await?;
    }

    let keep_going = args.interactive || args.question.is_none();
    let mut first = args.question.clone();
    let next_question = || match first.take() {
        Some(question) => Ok(Some(question)),
        None if keep_going => prompt_question(),
        None => Ok(None),
    };

    run_questions(&pipeline, output, &args, settings.top_k, keep_going, next_question).await?;
    Ok(())
}

/// Answer questions until `next_question` runs out
///
/// With `keep_going` a failed question is reported and the loop moves on to
/// the next one against the same index. Otherwise the failure is returned.
async fn run_questions<F>(
    pipeline: &QaPipeline,
    output: &OutputWriter,
    args: &AskArgs,
    top_k: usize,
    keep_going: bool,
    mut next_question: F,
) -> Result<usize>
where
    F: FnMut() -> Result<Option<String>>,
{
    let policy = if args.all_records {
        ExtractionPolicy::All
    } else {
        ExtractionPolicy::First
    };
    let mut answered = 0;

    while let Some(question) = next_question()? {
        let mut plan = QueryPlan::new(question.as_str()).with_top_k(top_k).with_policy(policy);
        if let Some(mode) = args.mode.task_mode() {
            plan = plan.with_mode(mode);
        }

        match answer_question(pipeline, output, &plan, &args.export_dir).await {
            Ok(()) => answered += 1,
            Err(e) if keep_going => errors::from_anyhow(e).display(),
            Err(e) => return Err(e),
        }
    }

    Ok(answered)
}

async fn answer_question(
    pipeline: &QaPipeline,
    output: &OutputWriter,
    plan: &QueryPlan,
    export_dir: &Path,
) -> Result<()> {
    let answer = with_spinner(
        "Thinking...",
        output.is_json(),
        pipeline.ask(plan),
        |a: &QaAnswer| format!("Answered in {} mode", a.mode),
    )
    .await?;

    let written = write_exports(&answer, export_dir)?;
    render(output, &plan.question, pipeline.backend_name(), answer, written)
}

fn write_exports(answer: &QaAnswer, dir: &Path) -> Result<Vec<String>> {
    answer
        .exports
        .iter()
        .map(|export| {
            export
                .write_to_dir(dir)
                .map(|path| path.display().to_string())
                .with_context(|| format!("Failed to write {}", export.file_name))
        })
        .collect()
}

fn render(
    output: &OutputWriter,
    question: &str,
    backend: &str,
    answer: QaAnswer,
    written: Vec<String>,
) -> Result<()> {
    if output.is_json() {
        return output.result(AskOutput {
            question: question.to_string(),
            backend: backend.to_string(),
            answer,
            written,
        });
    }

    output.section("Answer");
    output.text(&answer.answer);

    if !answer.sources.is_empty() {
        output.section("Sources");
        let rows = answer
            .sources
            .iter()
            .map(|s| SourceRow {
                row: s.row_index + 1,
                score: format!("{:.3}", s.score),
                excerpt: preview(&s.excerpt),
            })
            .collect();
        output.table(rows);
    }

    if answer.mode.is_structured() {
        println!();
        for path in &written {
            output.success(format!("Exported {}", path));
        }
        if let Some(ref reason) = answer.export_error {
            output.warning(format!("No record exported: {}", reason));
        }
    }

    Ok(())
}

/// One-line preview of a row document
fn preview(excerpt: &str) -> String {
    let line = excerpt.lines().collect::<Vec<_>>().join(" | ");
    if line.chars().count() <= EXCERPT_WIDTH {
        line
    } else {
        let cut: String = line.chars().take(EXCERPT_WIDTH - 1).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::Parser;
    use formqa_core::models::RowDocument;
    use formqa_core::FormqaError;
    use formqa_llm::{Generator, HashingEmbedder};
    use formqa_retrieval::LocalBackend;
    use formqa_store::{MemoryDocumentStore, MemoryVectorStore};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails its first call with a 503, then answers
    struct FlakyGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> formqa_core::Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(FormqaError::Upstream {
                    service: "chat".into(),
                    status: 503,
                    body: "busy".into(),
                });
            }
            Ok("Form 100 is General Liability".to_string())
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    async fn built_pipeline(generator: Arc<FlakyGenerator>) -> QaPipeline {
        let backend = LocalBackend::new(
            MemoryVectorStore::new(),
            MemoryDocumentStore::new(),
            HashingEmbedder::default(),
        );
        let mut pipeline = QaPipeline::new(Box::new(backend), generator);
        let rows = [RowDocument::new(0, "Form Number: 100\nForm Title: General Liability")];
        pipeline.build(&rows).await.unwrap();
        pipeline
    }

    fn ask_args(export_dir: &Path) -> AskArgs {
        let dir = export_dir.to_str().unwrap();
        AskArgs::try_parse_from(["ask", "forms.xlsx", "--export-dir", dir]).unwrap()
    }

    fn questions(list: &[&str]) -> impl FnMut() -> Result<Option<String>> {
        let mut queue: VecDeque<String> = list.iter().map(|q| q.to_string()).collect();
        move || Ok(queue.pop_front())
    }

    #[tokio::test]
    async fn test_failed_question_keeps_interactive_session() {
        let generator = Arc::new(FlakyGenerator { calls: AtomicUsize::new(0) });
        let pipeline = built_pipeline(generator.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let output = OutputWriter::new(true);
        let args = ask_args(dir.path());

        let answered = run_questions(
            &pipeline,
            &output,
            &args,
            3,
            true,
            questions(&["What is form 100?", "What is form 100 again?"]),
        )
        .await
        .unwrap();

        assert_eq!(answered, 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_question_failure_is_returned() {
        let generator = Arc::new(FlakyGenerator { calls: AtomicUsize::new(0) });
        let pipeline = built_pipeline(generator.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let output = OutputWriter::new(true);
        let args = ask_args(dir.path());

        let err = run_questions(
            &pipeline,
            &output,
            &args,
            3,
            false,
            questions(&["What is form 100?", "never asked"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FormqaError>(),
            Some(FormqaError::Upstream { status: 503, .. })
        ));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preview_joins_lines() {
        assert_eq!(
            preview("Form Number: 100\nForm Title: GL"),
            "Form Number: 100 | Form Title: GL"
        );
    }

    #[test]
    fn test_preview_truncates_long_rows() {
        let long = "x".repeat(200);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), EXCERPT_WIDTH);
        assert!(shown.ends_with('…'));
    }
}
