use crate::cli::UploadArgs;
use crate::config_loader::resolve_settings;
use crate::output::OutputWriter;
use crate::output_types::UploadOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use formqa_core::config::{BackendKind, CliConfigOverrides};
use formqa_core::formats::{read_sheet, validate_spreadsheet_path};
use formqa_core::processing::flatten_sheet;
use formqa_core::FormqaError;
use formqa_llm::HostedClient;
use formqa_retrieval::{HostedBackend, IndexSummary, RetrievalBackend};
use std::path::Path;

pub async fn execute(
    args: UploadArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    validate_spreadsheet_path(&args.path)?;

    // Uploading only makes sense against the hosted store
    let overrides = CliConfigOverrides {
        backend: Some(BackendKind::Hosted),
        store_id: args.store_id.clone().or(overrides.store_id),
        ..overrides
    };
    let settings = resolve_settings(config_path, overrides)?;
    let hosted = settings
        .hosted
        .as_ref()
        .ok_or_else(|| FormqaError::ConfigMissing { key: "hosted".to_string() })?;

    let sheet = read_sheet(&args.path)?;
    let documents = flatten_sheet(&sheet);
    if documents.is_empty() {
        return Err(FormqaError::empty("spreadsheet").into());
    }

    let mut backend = HostedBackend::new(HostedClient::new(hosted, settings.timeout)?);
    let summary = with_spinner(
        "Uploading corpus...",
        output.is_json(),
        backend.build(&documents),
        |s: &IndexSummary| format!("Uploaded {} rows to {}", s.documents_indexed, s.location),
    )
    .await?;

    if !output.is_json() {
        output.kv("Store", &summary.location);
        output.kv("Rows uploaded", summary.documents_indexed);
        if let Some(ref ack) = summary.acknowledgement {
            output.kv("Acknowledgement", ack);
        }
    }

    output.result(UploadOutput::new(args.path.display().to_string(), summary))
}
