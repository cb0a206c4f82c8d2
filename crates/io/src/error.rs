use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("invalid file type: '{file}' (allowed: {})", allowed.join(", "))]
    InvalidFileType { file: String, allowed: Vec<String> },

    #[error("{tool} not installed")]
    ToolMissing { tool: String, hint: String },

    #[error("text extraction failed for '{file}': {reason}")]
    Extraction { file: String, reason: String },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode '{file}': {reason}")]
    Decode { file: String, reason: String },
}

impl IoError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read { path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }

    pub fn decode(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode { file: file.into(), reason: reason.to_string() }
    }

    /// Install hint for a missing external tool, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ToolMissing { hint, .. } => Some(hint),
            _ => None,
        }
    }
}
