//! Answer post-processing: text cleaning and structured extraction
//!
//! Generator replies carry retrieval citations, stray markup and thread
//! markers. [`clean_answer`] strips them for display. In structured mode the
//! reply is also scanned for balanced `{...}` regions which are parsed and
//! validated into [`ExtractedRecord`]s and rendered as spreadsheet exports.

use formqa_core::error::{FormqaError, Result};
use formqa_core::formats::{export_record, RecordExport};
use formqa_core::models::{ExtractedRecord, ExtractionPolicy};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `【4:0†source】` and its ASCII-bracket variant
static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【\d+:\d+†source】|\[\d+:\d+†source\]").expect("valid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").expect("valid regex"));

static THREAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[thread:[^\]]+\]").expect("valid regex"));

static SOURCE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[source:[^\]]+\] converted\.txt").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Remove retrieval markers only, leaving markup and whitespace alone
fn strip_markers(text: &str) -> String {
    let text = CITATION.replace_all(text, "");
    let text = THREAD.replace_all(&text, "");
    SOURCE_FILE.replace_all(&text, "").into_owned()
}

fn clean_once(text: &str) -> String {
    let text = CITATION.replace_all(text, "");
    let text = TAG.replace_all(&text, "");
    let text = THREAD.replace_all(&text, "");
    let text = SOURCE_FILE.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Clean a reply for display
///
/// Strips citation markers, HTML-like tags, `[thread:…]` markers and
/// `[source:…] converted.txt` references, collapses whitespace runs to one
/// space and trims. Passes repeat until nothing changes, so removals that
/// expose a new marker are cleaned too and `clean_answer` is idempotent.
pub fn clean_answer(text: &str) -> String {
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Find balanced top-level `{...}` regions in order of appearance
///
/// Braces inside JSON string literals (including escaped quotes) do not count.
/// An opening brace that never closes is skipped and scanning resumes right
/// after it, so stray prose braces do not hide a later object.
pub fn find_json_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_end(text, start) {
            Some(end) => {
                objects.push(&text[start..end]);
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    objects
}

/// Byte index just past the brace closing the one at `start`
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse form records out of a structured reply
///
/// Every balanced region is tried in order. Regions that are not JSON
/// objects, or that share no key with the record schema, are skipped. With
/// [`ExtractionPolicy::First`] the first valid record wins.
pub fn extract_records(reply: &str, policy: ExtractionPolicy) -> Result<Vec<ExtractedRecord>> {
    let stripped = strip_markers(reply);
    let candidates = find_json_objects(&stripped);

    if candidates.is_empty() {
        return Err(FormqaError::ExtractionFailed {
            reason: "the reply contains no {...} block".to_string(),
        });
    }

    let mut records = Vec::new();
    let mut last_error = None;

    for candidate in candidates {
        let record = serde_json::from_str::<Value>(candidate)
            .map_err(FormqaError::from)
            .and_then(|value| ExtractedRecord::from_json(&value));

        match record {
            Ok(record) => {
                if !record.is_complete() {
                    tracing::debug!(
                        missing = ?record.missing_keys,
                        unexpected = ?record.unexpected_keys,
                        "Record does not match the schema exactly"
                    );
                }
                records.push(record);
                if policy == ExtractionPolicy::First {
                    break;
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    if records.is_empty() {
        return Err(FormqaError::ExtractionFailed {
            reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
        });
    }

    Ok(records)
}

/// Render each record as a workbook, keeping file names unique
pub fn export_records(records: &[ExtractedRecord]) -> Result<Vec<RecordExport>> {
    let mut used = HashSet::new();
    let mut exports = Vec::with_capacity(records.len());

    for record in records {
        let mut export = export_record(record)?;
        let stem = export.file_name.trim_end_matches(".xlsx").to_string();

        let mut n = 2;
        while !used.insert(export.file_name.clone()) {
            export.file_name = format!("{}_{}.xlsx", stem, n);
            n += 1;
        }

        exports.push(export);
    }

    Ok(exports)
}
