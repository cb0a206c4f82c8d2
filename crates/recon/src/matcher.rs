use std::collections::HashMap;

use tracing::debug;

use crate::config::{KeyAlias, ReconConfig, UnmatchedPolicy};
use crate::error::ReconError;
use crate::model::{
    CompositeKey, ErrorRecord, ImportRecord, ImportSet, MatchOutput, MatchedRow, OutputTable,
    LEADING_COLUMNS,
};

// ---------------------------------------------------------------------------
// Key normalization
// ---------------------------------------------------------------------------

/// Trim all three fields; strip leading zeros from the line number.
pub fn composite_key(filer_code: &str, entry_number: &str, line_number: &str) -> CompositeKey {
    CompositeKey {
        filer_code: filer_code.trim().to_string(),
        entry_number: entry_number.trim().to_string(),
        line_number: normalize_line_number(line_number),
    }
}

/// `"007"` → `"7"`, `""` → `""`, `"000"` → `"0"`.
pub fn normalize_line_number(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

fn error_key(record: &ErrorRecord) -> CompositeKey {
    composite_key(&record.filer_code, &record.entry_number, &record.line_number)
}

fn import_key(record: &ImportRecord) -> CompositeKey {
    composite_key(&record.filer_code, &record.entry_number, &record.line_number)
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Outer-on-error equality join on the composite key.
///
/// Every error record yields at least one row. An error matching several
/// import records yields one row per match, in import order.
pub fn match_records(
    errors: &[ErrorRecord],
    imports: &ImportSet,
    config: &ReconConfig,
) -> Result<MatchOutput, ReconError> {
    let mut index: HashMap<CompositeKey, Vec<usize>> = HashMap::new();
    for (i, record) in imports.records.iter().enumerate() {
        index.entry(import_key(record)).or_default().push(i);
    }

    for alias in &config.aliases {
        apply_alias(&mut index, errors, &imports.records, alias);
    }

    let mut output = MatchOutput::default();
    for (error_index, error) in errors.iter().enumerate() {
        match index.get(&error_key(error)) {
            Some(hits) if !hits.is_empty() => {
                output.matched_errors += 1;
                output.rows.extend(hits.iter().map(|&i| MatchedRow {
                    error_index,
                    import_index: Some(i),
                }));
            }
            _ => {
                output.unmatched_errors += 1;
                output.rows.push(MatchedRow {
                    error_index,
                    import_index: None,
                });
            }
        }
    }

    debug!(
        errors = errors.len(),
        imports = imports.len(),
        rows = output.rows.len(),
        unmatched = output.unmatched_errors,
        "joined error records"
    );

    if config.unmatched_policy == UnmatchedPolicy::FailWhenEmpty && output.matched_errors == 0 {
        return Err(ReconError::NoMatches);
    }

    Ok(output)
}

/// Make import rows carrying `alias.real` reachable under `alias.sentinel`,
/// but only when some error record actually uses the sentinel.
fn apply_alias(
    index: &mut HashMap<CompositeKey, Vec<usize>>,
    errors: &[ErrorRecord],
    imports: &[ImportRecord],
    alias: &KeyAlias,
) {
    let sentinel = alias.sentinel.trim();
    let real = alias.real.trim();
    if !errors.iter().any(|e| e.entry_number.trim() == sentinel) {
        return;
    }

    let mut aliased = 0usize;
    for (i, record) in imports.iter().enumerate() {
        let mut key = import_key(record);
        if key.entry_number != real {
            continue;
        }
        key.entry_number = sentinel.to_string();
        let hits = index.entry(key).or_default();
        hits.push(i);
        hits.sort_unstable();
        hits.dedup();
        aliased += 1;
    }

    debug!(sentinel, real, aliased, "applied entry-number alias");
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

/// Lay out matched rows: the five error/key columns first, then the import
/// business columns in spreadsheet order. Missing values become "".
pub fn format_output(errors: &[ErrorRecord], imports: &ImportSet, output: &MatchOutput) -> OutputTable {
    let business: Vec<usize> = imports
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !LEADING_COLUMNS.contains(&name.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(business.iter().map(|&i| imports.columns[i].clone()));

    let rows = output
        .rows
        .iter()
        .filter_map(|row| {
            let error = errors.get(row.error_index)?;
            let import = row.import_index.and_then(|i| imports.records.get(i));

            let mut values = vec![
                error.error_code.clone().unwrap_or_default(),
                error.error_description.clone(),
                error.filer_code.clone(),
                error.entry_number.clone(),
                error.line_number.clone(),
            ];
            values.extend(business.iter().map(|&col| {
                import
                    .and_then(|rec| rec.fields.get(col))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            }));
            Some(values)
        })
        .collect();

    OutputTable { columns, rows }
}
