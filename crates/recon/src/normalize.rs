use std::collections::HashSet;

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{CellValue, ImportRecord, ImportSet, RawTable};

/// Accepted textual date layouts, tried in order.
/// Two-digit-year layouts come first: `%Y` would read "24" as year 24.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Excel's day zero in the 1900 date system (serials ≥ 61).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Day zero for serials 1..=59, before the fictitious 1900-02-29.
const EXCEL_EARLY_EPOCH: (i32, u32, u32) = (1899, 12, 31);
/// Serial Excel assigns to 1900-02-29, a day that never existed.
const EXCEL_LEAP_BUG_SERIAL: u64 = 60;
/// Serial of 9999-12-31, the last date Excel can represent.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Validate, rename and clean a decoded spreadsheet into import records.
///
/// Key headers are looked up by their external names from
/// `config.columns`; every other column is carried through as a business
/// field in spreadsheet order. Rows are never dropped except as exact
/// duplicates of an earlier row.
pub fn normalize(table: &RawTable, config: &ReconConfig) -> Result<ImportSet, ReconError> {
    let headers: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("column_{}", i + 1)
            } else {
                h.to_string()
            }
        })
        .collect();

    validate_columns(&headers, config)?;

    let idx = |name: &str| headers.iter().position(|h| h == name.trim());
    let key_idx: Vec<usize> = config
        .columns
        .pairs()
        .iter()
        .filter_map(|(external, _)| idx(*external))
        .collect();
    let (filer_idx, entry_idx, line_idx) = match key_idx.as_slice() {
        [f, e, l] => (*f, *e, *l),
        // validate_columns guarantees all three exist
        _ => return Err(ReconError::load_failed("import", "key column lookup failed")),
    };

    let date_columns: HashSet<&str> = config.date_columns.iter().map(|c| c.trim()).collect();
    let business: Vec<(usize, &str, bool)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !key_idx.contains(i))
        .map(|(i, h)| (i, h.as_str(), date_columns.contains(h.as_str())))
        .collect();

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut records = Vec::with_capacity(table.rows.len());
    let mut duplicates = 0usize;

    for row in 0..table.rows.len() {
        let fields: Vec<(String, String)> = business
            .iter()
            .map(|&(col, name, is_date)| {
                let cell = table.cell(row, col);
                let value = if is_date { date_text(cell) } else { cell_text(cell) };
                (name.to_string(), value)
            })
            .collect();

        let record = ImportRecord {
            position: records.len(),
            filer_code: cell_text(table.cell(row, filer_idx)),
            entry_number: cell_text(table.cell(row, entry_idx)),
            line_number: cell_text(table.cell(row, line_idx)),
            fields,
        };

        let mut identity = vec![
            record.filer_code.clone(),
            record.entry_number.clone(),
            record.line_number.clone(),
        ];
        identity.extend(record.fields.iter().map(|(_, v)| v.clone()));
        if !seen.insert(identity) {
            duplicates += 1;
            continue;
        }

        records.push(record);
    }

    debug!(
        rows = table.rows.len(),
        records = records.len(),
        duplicates,
        "normalized import table"
    );

    Ok(ImportSet {
        columns: business.iter().map(|(_, name, _)| name.to_string()).collect(),
        records,
    })
}

/// Fail with the external names of every absent key header, in mapping order.
pub fn validate_columns(headers: &[String], config: &ReconConfig) -> Result<(), ReconError> {
    let missing: Vec<String> = config
        .columns
        .pairs()
        .iter()
        .map(|(external, _)| external.trim())
        .filter(|external| !headers.iter().any(|h| h.trim() == *external))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReconError::MissingColumns { columns: missing })
    }
}

/// Render any cell as trimmed text. Integral numbers lose their fraction,
/// so a numeric `7` and the text `"7"` agree.
pub fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

/// Render a date-column cell as `YYYY-MM-DD`, or empty when it is not a date.
pub fn date_text(cell: &CellValue) -> String {
    let date = match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => date_from_serial(*n),
        CellValue::Text(s) => parse_date(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    };
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Excel 1900-system serial to date. Time-of-day fractions are dropped.
/// Serial 60 (Excel's 1900-02-29) has no real date and yields `None`.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let days = serial.floor() as u64;
    let (y, m, d) = match days.cmp(&EXCEL_LEAP_BUG_SERIAL) {
        std::cmp::Ordering::Less => EXCEL_EARLY_EPOCH,
        std::cmp::Ordering::Equal => return None,
        std::cmp::Ordering::Greater => EXCEL_EPOCH,
    };
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(days))
}
