use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

pub const ERROR_CODE: &str = "error_code";
pub const ERROR_DESCRIPTION: &str = "error_description";
pub const FILER_CODE: &str = "filer_code";
pub const ENTRY_NUMBER: &str = "entry_number";
pub const LINE_NUMBER: &str = "line_number";

/// Fixed leading columns of every exported table.
pub const LEADING_COLUMNS: [&str; 5] =
    [ERROR_CODE, ERROR_DESCRIPTION, FILER_CODE, ENTRY_NUMBER, LINE_NUMBER];

// ---------------------------------------------------------------------------
// Error side
// ---------------------------------------------------------------------------

/// One error occurrence extracted from report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub error_code: Option<String>,
    pub error_description: String,
    pub filer_code: String,
    pub entry_number: String,
    pub line_number: String,
}

// ---------------------------------------------------------------------------
// Import side
// ---------------------------------------------------------------------------

/// A decoded spreadsheet cell before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// Header row plus data rows, as handed over by a spreadsheet decoder.
/// Rows may be shorter than the header; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }
}

/// One normalized spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// Dense 0-based row position after deduplication.
    pub position: usize,
    pub filer_code: String,
    pub entry_number: String,
    pub line_number: String,
    /// Business columns in spreadsheet order.
    pub fields: Vec<(String, String)>,
}

impl ImportRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Normalized import records plus the ordered business column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSet {
    pub columns: Vec<String>,
    pub records: Vec<ImportRecord>,
}

impl ImportSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Key columns under their canonical names, then business columns.
    pub fn to_table(&self) -> OutputTable {
        let mut columns: Vec<String> =
            [FILER_CODE, ENTRY_NUMBER, LINE_NUMBER].iter().map(|c| c.to_string()).collect();
        columns.extend(self.columns.iter().cloned());

        let rows = self
            .records
            .iter()
            .map(|r| {
                let mut row = vec![r.filer_code.clone(), r.entry_number.clone(), r.line_number.clone()];
                row.extend(r.fields.iter().map(|(_, v)| v.clone()));
                row
            })
            .collect();

        OutputTable { columns, rows }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Normalized `(filer_code, entry_number, line_number)`. Always strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub filer_code: String,
    pub entry_number: String,
    pub line_number: String,
}

/// Error record joined to at most one import record. Indices point into the
/// slices handed to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedRow {
    pub error_index: usize,
    pub import_index: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MatchOutput {
    pub rows: Vec<MatchedRow>,
    pub matched_errors: usize,
    pub unmatched_errors: usize,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Ordered columns and string rows, ready for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    /// Error records alone, under the five leading columns.
    pub fn from_errors(records: &[ErrorRecord]) -> Self {
        Self {
            columns: LEADING_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records
                .iter()
                .map(|r| {
                    vec![
                        r.error_code.clone().unwrap_or_default(),
                        r.error_description.clone(),
                        r.filer_code.clone(),
                        r.entry_number.clone(),
                        r.line_number.clone(),
                    ]
                })
                .collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `(row, column name)`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub error_records: usize,
    pub import_records: usize,
    pub output_rows: usize,
    pub matched_rows: usize,
    pub unmatched_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub unmatched_policy: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub table: OutputTable,
}
