use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::{format_output, match_records};
use crate::model::{ErrorRecord, ImportSet, ReconMeta, ReconResult, ReconSummary};

/// Join parsed error records against normalized import records and lay out
/// the export table. Returns the table plus summary counts.
pub fn run(
    config: &ReconConfig,
    errors: &[ErrorRecord],
    imports: &ImportSet,
) -> Result<ReconResult, ReconError> {
    let output = match_records(errors, imports, config)?;
    let table = format_output(errors, imports, &output);

    let matched_rows = output.rows.iter().filter(|r| r.import_index.is_some()).count();
    let summary = ReconSummary {
        error_records: errors.len(),
        import_records: imports.len(),
        output_rows: table.rows.len(),
        matched_rows,
        unmatched_errors: output.unmatched_errors,
    };

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            unmatched_policy: config.unmatched_policy.to_string(),
        },
        summary,
        table,
    })
}
