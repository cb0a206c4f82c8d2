//! `entrymatch run`, `parse` and `normalize`.

use std::io::Write;
use std::path::{Path, PathBuf};

use entrymatch_cli::exit_codes::ErrorOutput;
use entrymatch_cli::service::ProcessSummary;
use entrymatch_cli::{Service, ServiceError, SessionStore, Upload};
use entrymatch_io::{export, spreadsheet, IoError, Pdftotext, TextExtractor};
use entrymatch_recon::model::OutputTable;
use entrymatch_recon::{combine, normalize, ErrorParser, ReconError};
use serde_json::{Map, Value};

use crate::{load_settings, CliError, TableFormat};

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(
    config: Option<&Path>,
    pdfs: Vec<PathBuf>,
    import: PathBuf,
    out: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let mut service = Service::new(settings, Pdftotext).map_err(|e| report(e, json))?;
    let session = SessionStore::new_session_id();

    let result = run_session(&mut service, &session, &pdfs, &import, json, quiet);
    // Uploaded copies are only needed for this run.
    service.discard(&session);
    let (processed, artifact) = result?;

    if let Some(ref path) = out {
        std::fs::copy(&artifact, path)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json {
        let mut value = serde_json::to_value(&processed)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        if let Value::Object(ref mut map) = value {
            map.insert("output_path".into(), Value::String(artifact.display().to_string()));
        }
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{text}");
    } else {
        print_summary(&processed);
    }
    Ok(())
}

fn run_session(
    service: &mut Service<Pdftotext>,
    session: &str,
    pdfs: &[PathBuf],
    import: &Path,
    json: bool,
    quiet: bool,
) -> Result<(ProcessSummary, PathBuf), CliError> {
    let uploads = pdfs
        .iter()
        .map(|p| Upload::from_path(p))
        .collect::<Result<Vec<_>, IoError>>()?;
    let import_upload = Upload::from_path(import)?;

    let pdf_summary = service
        .upload_pdfs(session, uploads)
        .map_err(|e| report(e, json))?;
    if !quiet {
        eprintln!(
            "extracted {} error records from {} PDF(s)",
            pdf_summary.records, pdf_summary.files
        );
    }

    let import_summary = service
        .upload_import(session, import_upload)
        .map_err(|e| report(e, json))?;
    if !quiet {
        eprintln!(
            "loaded {} import records from {}",
            import_summary.records, import_summary.file
        );
    }

    let processed = service.process(session).map_err(|e| report(e, json))?;
    let artifact = service
        .artifact_path(&processed.output_file)
        .map_err(|e| report(e, json))?;
    if !quiet {
        eprintln!("wrote {}", artifact.display());
    }
    Ok((processed, artifact))
}

/// With `--json`, failures go to stderr as one JSON object.
fn report(err: ServiceError, json: bool) -> CliError {
    if json {
        let output = ErrorOutput::from_service_error(&err);
        if let Ok(text) = serde_json::to_string(&output) {
            eprintln!("{text}");
            return CliError::silent(output.exit_code);
        }
    }
    CliError::from(err)
}

fn print_summary(processed: &ProcessSummary) {
    let s = &processed.summary;
    println!("error records:     {}", s.error_records);
    println!("import records:    {}", s.import_records);
    println!("output rows:       {}", s.output_rows);
    println!("matched rows:      {}", s.matched_rows);
    println!("unmatched errors:  {}", s.unmatched_errors);
    println!("output file:       {}", processed.output_file);
}

// ============================================================================
// parse
// ============================================================================

pub fn cmd_parse(
    config: Option<&Path>,
    pdfs: Vec<PathBuf>,
    format: TableFormat,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let parser = ErrorParser::new(&settings.recon.patterns)?;
    let extractor = Pdftotext;

    let mut documents = Vec::with_capacity(pdfs.len());
    for path in &pdfs {
        if !path.is_file() {
            return Err(CliError::args(format!("file not found: {}", path.display())));
        }
        let text = extractor.extract(path)?;
        documents.push(parser.parse_document(&file_label(path), &text)?);
    }
    let records = combine(documents)?;

    emit(&OutputTable::from_errors(&records), format, out.as_deref())
}

// ============================================================================
// normalize
// ============================================================================

pub fn cmd_normalize(
    config: Option<&Path>,
    file: PathBuf,
    format: TableFormat,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    if !file.is_file() {
        return Err(CliError::args(format!("file not found: {}", file.display())));
    }

    let raw = spreadsheet::read_table(&file).map_err(|e| match e {
        IoError::InvalidFileType { .. } => CliError::from(e),
        other => CliError::from(ReconError::load_failed(file_label(&file), other)),
    })?;
    let imports = normalize(&raw, &settings.recon)?;

    emit(&imports.to_table(), format, out.as_deref())
}

// ============================================================================
// Output
// ============================================================================

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn emit(table: &OutputTable, format: TableFormat, out: Option<&Path>) -> Result<(), CliError> {
    match (format, out) {
        (TableFormat::Csv, Some(path)) => export::save_csv(table, path)?,
        (TableFormat::Csv, None) => {
            let stdout = std::io::stdout();
            export::write_csv(table, stdout.lock())
                .map_err(|e| CliError::io(format!("cannot write to stdout: {e}")))?;
        }
        (TableFormat::Json, out) => {
            let text = serde_json::to_string_pretty(&table_json(table))
                .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
            match out {
                Some(path) => std::fs::write(path, format!("{text}\n"))
                    .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{text}")
                        .map_err(|e| CliError::io(format!("cannot write to stdout: {e}")))?;
                }
            }
        }
        (TableFormat::Xlsx, Some(path)) => export::write_xlsx(table, path)?,
        (TableFormat::Xlsx, None) => {
            return Err(CliError::args("--format xlsx needs an output file")
                .with_hint("add --out <file.xlsx>"));
        }
    }

    if let Some(path) = out {
        eprintln!("wrote {} rows to {}", table.rows.len(), path.display());
    }
    Ok(())
}

/// Rows as JSON objects keyed by column name, in column order.
fn table_json(table: &OutputTable) -> Value {
    Value::Array(
        table
            .rows
            .iter()
            .map(|row| {
                let map: Map<String, Value> = table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(map)
            })
            .collect(),
    )
}
