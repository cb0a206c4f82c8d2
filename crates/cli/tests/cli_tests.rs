// Black-box tests for the `entrymatch` binary. None of these need pdftotext.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn entrymatch(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_entrymatch"));
    cmd.env_remove("ENTRYMATCH_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

/// Temp dir holding a config whose upload dir is inside the same temp dir.
fn setup(extra: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let uploads = dir.path().join("uploads");
    std::fs::write(
        &config,
        format!("upload_dir = {:?}\n{extra}", uploads.display().to_string()),
    )
    .unwrap();
    (dir, config)
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

const IMPORT_CSV: &str = "\
Filer Code,Entry Number,7501 Line Number,Entry Date,Additional Data
GU6,60061040,25,01/15/2024,x
GU6,60061040,25,01/15/2024,x
 ABC ,123,007,,y
";

// -------------------------------------------------------------------------
// config
// -------------------------------------------------------------------------

#[test]
fn config_show_prints_effective_toml() {
    let (_dir, config) = setup("[recon.patterns]\nfiler_prefix = \"AB1\"\n");
    let out = entrymatch(&config).args(["config", "show"]).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("filer_prefix = \"AB1\""), "stdout: {text}");
    assert!(text.contains("max_upload_bytes = 104857600"), "stdout: {text}");
}

#[test]
fn config_validate_accepts_good_file() {
    let (_dir, config) = setup("");
    let out = entrymatch(&config).args(["config", "validate"]).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).starts_with("ok: "));
}

#[test]
fn config_validate_rejects_bad_alias() {
    let (dir, config) = setup("");
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[[recon.aliases]]\nsentinel = \"1\"\nreal = \"1\"\n").unwrap();

    let out = entrymatch(&config)
        .args(["config", "validate"])
        .arg(&bad)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("points at itself"), "stderr: {}", stderr(&out));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = entrymatch(&dir.path().join("nope.toml"))
        .args(["config", "show"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("hint:"));
}

// -------------------------------------------------------------------------
// normalize
// -------------------------------------------------------------------------

#[test]
fn normalize_csv_to_json() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.csv");
    std::fs::write(&input, IMPORT_CSV).unwrap();

    let out = entrymatch(&config)
        .arg("normalize")
        .arg(&input)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let rows: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2, "duplicate row dropped");
    assert_eq!(rows[0]["entry_number"], "60061040");
    assert_eq!(rows[0]["Entry Date"], "2024-01-15");
    assert_eq!(rows[1]["filer_code"], "ABC");
    assert_eq!(rows[1]["line_number"], "007");
    assert_eq!(rows[1]["Entry Date"], "");
}

#[test]
fn normalize_csv_default_output() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.csv");
    std::fs::write(&input, IMPORT_CSV).unwrap();

    let out = entrymatch(&config).arg("normalize").arg(&input).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("filer_code,entry_number,line_number,Entry Date,Additional Data")
    );
    assert_eq!(lines.next(), Some("GU6,60061040,25,2024-01-15,x"));
}

#[test]
fn normalize_to_xlsx_file() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.csv");
    let output = dir.path().join("clean.xlsx");
    std::fs::write(&input, IMPORT_CSV).unwrap();

    let out = entrymatch(&config)
        .arg("normalize")
        .arg(&input)
        .args(["--format", "xlsx", "--out"])
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(output.exists());
    assert!(stderr(&out).contains("wrote 2 rows"));
}

#[test]
fn normalize_xlsx_without_out_is_usage_error() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.csv");
    std::fs::write(&input, IMPORT_CSV).unwrap();

    let out = entrymatch(&config)
        .arg("normalize")
        .arg(&input)
        .args(["--format", "xlsx"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn normalize_missing_columns_exit_code() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.csv");
    std::fs::write(&input, "Filer Code,Entry Number\nGU6,1\n").unwrap();

    let out = entrymatch(&config).arg("normalize").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(21));
    assert!(stderr(&out).contains("7501 Line Number"));
}

#[test]
fn normalize_custom_column_mapping() {
    let (dir, config) = setup("[recon.columns]\nentry_number = \"Entry No\"\n");
    let input = dir.path().join("imports.csv");
    std::fs::write(&input, "Filer Code,Entry No,7501 Line Number\nGU6,5,1\n").unwrap();

    let out = entrymatch(&config)
        .arg("normalize")
        .arg(&input)
        .args(["-f", "json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("\"entry_number\": \"5\""));
}

#[test]
fn normalize_unsupported_extension() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.txt");
    std::fs::write(&input, "x").unwrap();

    let out = entrymatch(&config).arg("normalize").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn normalize_corrupt_workbook_is_load_failure() {
    let (dir, config) = setup("");
    let input = dir.path().join("imports.xlsx");
    std::fs::write(&input, "not a workbook").unwrap();

    let out = entrymatch(&config).arg("normalize").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(20));
    assert!(stderr(&out).contains("imports.xlsx"));
}

// -------------------------------------------------------------------------
// run / parse argument handling
// -------------------------------------------------------------------------

#[test]
fn run_with_missing_pdf_is_io_error() {
    let (dir, config) = setup("");
    let out = entrymatch(&config)
        .args(["run", "--pdf"])
        .arg(dir.path().join("missing.pdf"))
        .arg("--import")
        .arg(dir.path().join("imports.xlsx"))
        .args(["-q"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn run_rejects_wrong_import_type_as_json() {
    let (dir, config) = setup("");
    let pdf = dir.path().join("errors.pdf");
    let import = dir.path().join("imports.txt");
    std::fs::write(&pdf, "%PDF-1.4").unwrap();
    std::fs::write(&import, "x").unwrap();

    let out = entrymatch(&config)
        .args(["run", "--pdf"])
        .arg(&pdf)
        .arg("--import")
        .arg(&import)
        .args(["--json", "-q"])
        .output()
        .unwrap();
    // The pdf step may fail first when pdftotext is absent or rejects the
    // stub; either way the failure is reported as one JSON object.
    assert_ne!(out.status.code(), Some(0));
    let err: serde_json::Value = serde_json::from_str(stderr(&out).trim()).unwrap();
    assert!(err["error"].is_string());
    assert_eq!(err["exit_code"].as_u64(), out.status.code().map(|c| c as u64));

    let leftovers = std::fs::read_dir(dir.path().join("uploads"))
        .map(|d| d.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0, "failed run left uploaded copies behind");
}

#[test]
fn parse_missing_file_is_usage_error() {
    let (dir, config) = setup("");
    let out = entrymatch(&config)
        .arg("parse")
        .arg(dir.path().join("nope.pdf"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn no_command_prints_usage() {
    let (_dir, config) = setup("");
    let out = entrymatch(&config).output().unwrap();
    assert!(out.status.success());
    assert!(stderr(&out).contains("Usage: entrymatch"));
}
