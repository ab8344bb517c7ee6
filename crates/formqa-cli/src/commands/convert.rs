use crate::cli::ConvertArgs;
use crate::output::OutputWriter;
use crate::output_types::ConvertOutput;
use anyhow::{Context, Result};
use formqa_core::formats::{read_sheet, validate_spreadsheet_path};
use formqa_core::processing::{corpus, flatten_sheet};
use formqa_core::FormqaError;
use std::fs;

pub fn execute(args: ConvertArgs, output: &OutputWriter) -> Result<()> {
    validate_spreadsheet_path(&args.path)?;
    let sheet = read_sheet(&args.path)?;

    let documents = flatten_sheet(&sheet);
    if documents.is_empty() {
        return Err(FormqaError::empty("spreadsheet").into());
    }

    let text = corpus(&documents);
    fs::write(&args.output, &text)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let blank_rows = documents.iter().filter(|d| d.is_empty()).count();
    tracing::debug!(rows = documents.len(), blank_rows, "Converted spreadsheet");

    output.success(format!(
        "Converted {} rows from {} into {}",
        documents.len() - blank_rows,
        args.path.display(),
        args.output.display()
    ));
    if blank_rows > 0 {
        output.info(format!("Skipped {} blank rows", blank_rows));
    }

    output.result(ConvertOutput {
        input: args.path.display().to_string(),
        output: args.output.display().to_string(),
        rows: documents.len() - blank_rows,
        blank_rows,
        bytes: text.len(),
    })
}
