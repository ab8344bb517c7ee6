use crate::models::{RowDocument, Sheet, TableRow};

/// Flatten one row into "column: value" lines, skipping blank cells
///
/// Column order is preserved. A row whose cells are all blank flattens to an
/// empty string.
pub fn flatten_row(row: &TableRow) -> String {
    row.cells
        .iter()
        .filter(|cell| !cell.is_blank())
        .filter_map(|cell| cell.value.as_deref().map(|value| format!("{}: {}", cell.column, value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn every data row of a sheet into a row document
///
/// Blank rows are kept (with empty text) so document ids keep matching row
/// positions; retrieval backends skip them.
pub fn flatten_sheet(sheet: &Sheet) -> Vec<RowDocument> {
    let documents: Vec<RowDocument> =
        sheet.rows.iter().map(|row| RowDocument::new(row.index, flatten_row(row))).collect();

    let blank = documents.iter().filter(|d| d.is_empty()).count();
    tracing::debug!(
        sheet = %sheet.name,
        rows = documents.len(),
        blank_rows = blank,
        "Flattened sheet into row documents"
    );

    documents
}

/// Join row documents into the uploadable text corpus, one blank line between rows
pub fn corpus(documents: &[RowDocument]) -> String {
    documents
        .iter()
        .filter(|d| !d.is_empty())
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use proptest::prelude::*;

    fn row(cells: &[(&str, Option<&str>)]) -> TableRow {
        TableRow::new(0, cells.iter().map(|(c, v)| Cell::new(*c, *v)).collect())
    }

    #[test]
    fn test_flatten_omits_blank_cells() {
        let row = row(&[("A", Some("1")), ("B", None), ("C", Some("3"))]);
        assert_eq!(flatten_row(&row), "A: 1\nC: 3");
    }

    #[test]
    fn test_flatten_whitespace_cell_is_blank() {
        let row = row(&[("A", Some("  ")), ("B", Some("2"))]);
        assert_eq!(flatten_row(&row), "B: 2");
    }

    #[test]
    fn test_flatten_all_blank_row() {
        let row = row(&[("A", None), ("B", Some(""))]);
        assert_eq!(flatten_row(&row), "");
    }

    #[test]
    fn test_flatten_sheet_keeps_row_indices() {
        let mut sheet = Sheet::new("Forms", vec!["Form Number".into(), "Form Title".into()]);
        sheet.push_row(vec![Some("100".into()), Some("General Liability".into())]);
        sheet.push_row(vec![None, None]);
        sheet.push_row(vec![Some("300".into()), None]);

        let docs = flatten_sheet(&sheet);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].text, "Form Number: 100\nForm Title: General Liability");
        assert!(docs[1].is_empty());
        assert_eq!(docs[2].source_row_index, 2);
        assert_eq!(docs[2].text, "Form Number: 300");
    }

    #[test]
    fn test_corpus_joins_with_blank_line() {
        let docs = vec![
            RowDocument::new(0, "A: 1"),
            RowDocument::new(1, ""),
            RowDocument::new(2, "A: 3\nB: 4"),
        ];
        assert_eq!(corpus(&docs), "A: 1\n\nA: 3\nB: 4");
    }

    proptest! {
        #[test]
        fn prop_flatten_has_one_line_per_filled_cell(
            values in proptest::collection::vec(proptest::option::of("[a-z0-9]{1,8}"), 0..8)
        ) {
            let cells: Vec<Cell> = values
                .iter()
                .enumerate()
                .map(|(i, v)| Cell::new(format!("col{}", i), v.clone()))
                .collect();
            let filled = values.iter().filter(|v| v.is_some()).count();

            let text = flatten_row(&TableRow::new(0, cells));
            let lines = if text.is_empty() { 0 } else { text.lines().count() };
            prop_assert_eq!(lines, filled);
        }
    }
}
