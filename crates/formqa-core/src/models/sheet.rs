use serde::{Deserialize, Serialize};

/// One cell of a data row, tagged with its column name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub column: String,
    pub value: Option<String>,
}

impl Cell {
    pub fn new(column: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self { column: column.into(), value: value.map(Into::into) }
    }

    /// Absent or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
    }
}

/// A data row: ordered cells plus the row's position in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// 0-based index among data rows (the header row is not counted)
    pub index: usize,
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// Value of a named column, if present and non-blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.column == column)
            .filter(|c| !c.is_blank())
            .and_then(|c| c.value.as_deref())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

/// A single worksheet: a header row followed by one row per form record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Sheet {
    /// Create an empty sheet, normalising the header row
    ///
    /// Blank headers become `Unnamed: <col>` and repeated names get a `.<n>`
    /// suffix, so every column name is unique and non-empty.
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self { name: name.into(), headers: normalize_headers(headers), rows: Vec::new() }
    }

    /// Append a data row; values are matched to headers by position
    ///
    /// Missing trailing values are treated as blank, extra values are dropped.
    pub fn push_row(&mut self, values: Vec<Option<String>>) {
        let mut values = values.into_iter();
        let cells = self
            .headers
            .iter()
            .map(|header| Cell { column: header.clone(), value: values.next().flatten() })
            .collect();

        let index = self.rows.len();
        self.rows.push(TableRow::new(index, cells));
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());

    for (col, header) in headers.into_iter().enumerate() {
        let base = header.trim();
        let base =
            if base.is_empty() { format!("Unnamed: {}", col) } else { base.to_string() };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.push(name);
    }

    seen
}
