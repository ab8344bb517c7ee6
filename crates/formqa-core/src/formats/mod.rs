//! Spreadsheet input and output
//!
//! Uploaded workbooks are read with calamine (xlsx, xlsm, xls, xlsb, ods);
//! extracted records are written back as xlsx with rust_xlsxwriter.

use std::path::Path;

use crate::error::{FormqaError, Result};

pub mod xlsx;

pub use xlsx::{cell_to_text, export_record, read_sheet, read_sheet_from_bytes, RecordExport};

/// File extensions accepted as spreadsheet input
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Check that a path points at an existing file with a spreadsheet extension
pub fn validate_spreadsheet_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(FormqaError::Spreadsheet {
            reason: format!("file not found: {}", path.display()),
        });
    }

    let extension =
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(FormqaError::Spreadsheet {
            reason: format!(
                "unsupported file type '{}' (expected one of: {})",
                path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        });
    }

    Ok(())
}
