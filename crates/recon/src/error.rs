use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReconError {
    /// A document produced no error records at all.
    #[error("no valid error records found in '{document}'")]
    ExtractionEmpty { document: String },

    /// `combine` was called with zero documents.
    #[error("no documents provided to combine")]
    NoInput,

    /// Required spreadsheet headers are absent (external names, mapping order).
    #[error("import file is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Decode or cleaning failure while loading an import spreadsheet.
    #[error("failed to process import file '{file}': {cause}")]
    SpreadsheetLoadFailed { file: String, cause: String },

    /// No error record matched any import row (`fail_when_empty` policy only).
    #[error("no matching records found between error data and import records")]
    NoMatches,

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (empty prefix, duplicate alias, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

impl ReconError {
    /// Wrap any lower-level failure as a spreadsheet load failure for `file`.
    pub fn load_failed(file: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::SpreadsheetLoadFailed {
            file: file.into(),
            cause: cause.to_string(),
        }
    }
}
