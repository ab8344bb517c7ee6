use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, DataType, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::error::{FormqaError, Result};
use crate::models::{ExtractedRecord, Sheet};

/// Read the first worksheet of a workbook on disk
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    super::validate_spreadsheet_path(path)?;

    let mut workbook = open_workbook_auto(path).map_err(|e| FormqaError::Spreadsheet {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    first_sheet(&mut workbook)
}

/// Read the first worksheet of an uploaded workbook held in memory
pub fn read_sheet_from_bytes(bytes: &[u8]) -> Result<Sheet> {
    if bytes.is_empty() {
        return Err(FormqaError::empty("spreadsheet"));
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
        FormqaError::Spreadsheet { reason: format!("failed to open workbook: {}", e) }
    })?;

    first_sheet(&mut workbook)
}

fn first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Sheet> {
    let sheet_names = workbook.sheet_names().to_vec();
    let name = sheet_names.first().cloned().ok_or_else(|| FormqaError::Spreadsheet {
        reason: "workbook contains no sheets".to_string(),
    })?;

    let range = workbook.worksheet_range(&name).map_err(|e| FormqaError::Spreadsheet {
        reason: format!("failed to read sheet '{}': {}", name, e),
    })?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| FormqaError::Spreadsheet {
        reason: format!("sheet '{}' has no header row", name),
    })?;

    let headers: Vec<String> =
        header_row.iter().map(|cell| cell_to_text(cell).unwrap_or_default()).collect();
    let mut sheet = Sheet::new(name, headers);

    for row in rows {
        sheet.push_row(row.iter().map(cell_to_text).collect());
    }

    tracing::info!(
        sheet = %sheet.name,
        columns = sheet.headers.len(),
        rows = sheet.row_count(),
        "Read spreadsheet"
    );

    Ok(sheet)
}

/// Render a cell as text; empty and error cells are blank
pub fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(n) => {
            // integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match cell.as_datetime() {
            Some(value) if value.time() == chrono::NaiveTime::MIN => {
                Some(value.format("%Y-%m-%d").to_string())
            }
            Some(value) => Some(value.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Some(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// A record rendered as a downloadable two-row workbook
#[derive(Debug, Clone, Serialize)]
pub struct RecordExport {
    /// Download name, derived from the form code
    pub file_name: String,

    /// Row 1: the record keys
    pub header: Vec<String>,

    /// Row 2: the record values
    pub values: Vec<String>,

    /// xlsx file contents
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl RecordExport {
    /// Write the workbook into a directory, returning the full path
    pub fn write_to_dir(&self, dir: &Path) -> Result<std::path::PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Render a record as a one-sheet workbook: header row, then value row
pub fn export_record(record: &ExtractedRecord) -> Result<RecordExport> {
    let header: Vec<String> = ExtractedRecord::header().iter().map(|k| k.to_string()).collect();
    let values = record.values();

    let to_export_err =
        |e: rust_xlsxwriter::XlsxError| FormqaError::Export { reason: e.to_string() };

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Record").map_err(to_export_err)?;

    for (col, key) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, key, &bold).map_err(to_export_err)?;
    }
    for (col, value) in values.iter().enumerate() {
        worksheet.write_string(1, col as u16, value).map_err(to_export_err)?;
    }

    let bytes = workbook.save_to_buffer().map_err(to_export_err)?;

    Ok(RecordExport { file_name: record.export_file_name(), header, values, bytes })
}
