//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, rejected file)|
//! | 3-9     | io / config      | File system and configuration codes      |
//! | 10-19   | extraction       | PDF text extraction and record parsing   |
//! | 20-29   | spreadsheet      | Import-record decoding and validation    |
//! | 30-39   | matching         | Join and batch state                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the matching `*_exit_code` function

use entrymatch_io::IoError;
use entrymatch_recon::ReconError;

use crate::service::ServiceError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, no files, wrong extension, oversized file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// IO / config (3-9)
// =============================================================================

/// Cannot read or write a file.
pub const EXIT_IO: u8 = 3;

/// Config file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 4;

// =============================================================================
// Extraction (10-19)
// =============================================================================

/// A document produced no error records.
pub const EXIT_EXTRACT_EMPTY: u8 = 10;

/// pdftotext is not installed.
pub const EXIT_EXTRACT_TOOL_MISSING: u8 = 11;

/// pdftotext failed or the PDF has no text layer.
pub const EXIT_EXTRACT_FAILED: u8 = 12;

/// No documents were given to combine.
pub const EXIT_EXTRACT_NO_INPUT: u8 = 13;

// =============================================================================
// Spreadsheet (20-29)
// =============================================================================

/// Import file could not be decoded.
pub const EXIT_SHEET_LOAD: u8 = 20;

/// Import file lacks one or more mapped key columns.
pub const EXIT_SHEET_MISSING_COLUMNS: u8 = 21;

// =============================================================================
// Matching (30-39)
// =============================================================================

/// No error record matched (`fail_when_empty` policy).
pub const EXIT_NO_MATCHES: u8 = 30;

/// Processing requested before both uploads were held.
pub const EXIT_BATCH_INCOMPLETE: u8 = 31;

/// Requested artifact does not exist in the upload directory.
pub const EXIT_UNKNOWN_ARTIFACT: u8 = 32;

// =============================================================================
// Error mapping
// =============================================================================

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ExtractionEmpty { .. } => EXIT_EXTRACT_EMPTY,
        ReconError::NoInput => EXIT_EXTRACT_NO_INPUT,
        ReconError::MissingColumns { .. } => EXIT_SHEET_MISSING_COLUMNS,
        ReconError::SpreadsheetLoadFailed { .. } => EXIT_SHEET_LOAD,
        ReconError::NoMatches => EXIT_NO_MATCHES,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::InvalidFileType { .. } => EXIT_USAGE,
        IoError::ToolMissing { .. } => EXIT_EXTRACT_TOOL_MISSING,
        IoError::Extraction { .. } => EXIT_EXTRACT_FAILED,
        IoError::Read { .. } | IoError::Write { .. } => EXIT_IO,
        IoError::Decode { .. } => EXIT_SHEET_LOAD,
    }
}

pub fn service_exit_code(err: &ServiceError) -> u8 {
    match err {
        ServiceError::NoFiles
        | ServiceError::InvalidFileType { .. }
        | ServiceError::FileTooLarge { .. } => EXIT_USAGE,
        ServiceError::BatchIncomplete { .. } => EXIT_BATCH_INCOMPLETE,
        ServiceError::UnknownArtifact(_) => EXIT_UNKNOWN_ARTIFACT,
        ServiceError::Recon(e) => recon_exit_code(e),
        ServiceError::Io(e) => io_exit_code(e),
    }
}

/// Structured error output for `--json` runs.
#[derive(Debug, serde::Serialize)]
pub struct ErrorOutput {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub exit_code: u8,
}

impl ErrorOutput {
    pub fn from_service_error(err: &ServiceError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
            hint: err.hint().map(str::to_string),
            exit_code: service_exit_code(err),
        }
    }
}
