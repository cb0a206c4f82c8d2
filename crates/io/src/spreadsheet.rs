// Spreadsheet decode: calamine workbooks and CSV into a RawTable

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use entrymatch_recon::model::{CellValue, RawTable};
use entrymatch_recon::normalize::{cell_text, date_from_serial, parse_date};
use tracing::debug;

use crate::error::IoError;
use crate::pdf::display_name;

/// Extensions decoded through calamine.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Read the first worksheet (or the CSV file) into a header row plus data
/// rows. The first non-empty row is the header; fully empty rows are
/// skipped.
pub fn read_table(path: &Path) -> Result<RawTable, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let rows = if ext == "csv" {
        read_csv_rows(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook_rows(path)?
    } else {
        let mut allowed: Vec<String> = WORKBOOK_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        allowed.push("csv".to_string());
        return Err(IoError::InvalidFileType {
            file: display_name(path),
            allowed,
        });
    };

    let table = build_table(rows);
    debug!(
        file = %display_name(path),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "decoded spreadsheet"
    );
    Ok(table)
}

fn build_table(rows: Vec<Vec<CellValue>>) -> RawTable {
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|c| !is_blank(c)));

    let Some(header) = rows.next() else {
        return RawTable::default();
    };

    let mut table = RawTable::new(header.iter().map(cell_text).collect());
    for row in rows {
        table.push_row(row);
    }
    table
}

fn is_blank(cell: &CellValue) -> bool {
    match cell {
        CellValue::Empty => true,
        CellValue::Text(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Workbooks
// ---------------------------------------------------------------------------

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, IoError> {
    let file = display_name(path);
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::decode(&file, format!("failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::decode(&file, "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::decode(&file, format!("failed to read sheet '{sheet_name}': {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        Data::DateTime(dt) => {
            // Assumes the 1900 date system, like most workbooks.
            let serial = dt.as_f64();
            match date_from_serial(serial) {
                Some(d) => CellValue::Date(d),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => match parse_date(s) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, IoError> {
    let content = read_file_as_utf8(path)?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IoError::decode(display_name(path), e))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback for
/// Excel-exported CSVs).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Pick the delimiter that splits the first lines into the most consistent
/// number of fields (>1). Comma when nothing fits.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b',', b';', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else { continue };
        if target <= 1 {
            continue;
        }
        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}
