//! Error-report text parser.
//!
//! Scans text extracted from customs error-report PDFs line by line and
//! yields one [`ErrorRecord`] per pattern match. Two report layouts are
//! recognised, tried in [`ErrorLayout::PRIORITY`] order on every line:
//!
//! ```text
//! E1 F551 [EXCESS DUTY CLAIMED] [GU660061040] [25]          bracketed
//! E1 F551 EXCESS DUTY CLAIMED GU660061040 25 GU6000123      multi-token
//! ```

use regex::{Captures, Regex};
use tracing::debug;

use crate::config::PatternConfig;
use crate::error::ReconError;
use crate::model::ErrorRecord;

/// Length of the filer code at the front of a combined identifier.
const FILER_CODE_LEN: usize = 3;

/// `[E1 F551 ]` optional, then three bracketed groups.
const BRACKETED: &str = r"(?:\bE\d+\s+F(?P<code>[A-Z0-9]+)\s+)?\[(?P<desc>.*?)\]\s*\[(?P<combined>[A-Z0-9]+)\]\s*\[(?P<line>\d+)\]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLayout {
    /// Single-line bracketed layout; filer code sliced from the combined id.
    Bracketed,
    /// Whitespace-separated layout; filer code is the configured prefix.
    MultiToken,
}

impl ErrorLayout {
    pub const PRIORITY: [ErrorLayout; 2] = [ErrorLayout::Bracketed, ErrorLayout::MultiToken];
}

impl std::fmt::Display for ErrorLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bracketed => write!(f, "bracketed"),
            Self::MultiToken => write!(f, "multi_token"),
        }
    }
}

/// Compiled patterns for one [`PatternConfig`].
#[derive(Debug, Clone)]
pub struct ErrorParser {
    bracketed: Regex,
    multi_token: Regex,
    secondary: Regex,
    filer_prefix: String,
}

impl ErrorParser {
    pub fn new(patterns: &PatternConfig) -> Result<Self, ReconError> {
        let prefix = regex::escape(patterns.filer_prefix.trim());
        let marker = regex::escape(patterns.secondary_marker.trim());

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ReconError::ConfigValidation(e.to_string()))
        };

        Ok(Self {
            bracketed: compile(BRACKETED)?,
            multi_token: compile(&format!(
                r"\bE\d+\s+F(?P<code>\d{{3}})\s+(?P<desc>.+?)\s+{prefix}(?P<entry>\d+)\s+(?P<line>\d+)\b(?:\s+{prefix}\S*)?"
            ))?,
            secondary: compile(&format!(r"{marker}\s*(\d+)"))?,
            filer_prefix: patterns.filer_prefix.trim().to_string(),
        })
    }

    /// Parse one line. Lines matching no layout yield nothing.
    pub fn parse_line(&self, line: &str) -> Vec<ErrorRecord> {
        for layout in ErrorLayout::PRIORITY {
            let records: Vec<ErrorRecord> = match layout {
                ErrorLayout::Bracketed => self
                    .bracketed
                    .captures_iter(line)
                    .map(|caps| self.from_bracketed(&caps))
                    .collect(),
                ErrorLayout::MultiToken => self
                    .multi_token
                    .captures_iter(line)
                    .map(|caps| self.from_multi_token(&caps))
                    .collect(),
            };
            if !records.is_empty() {
                return records;
            }
        }
        Vec::new()
    }

    /// Parse a whole text blob; records come back in text order.
    pub fn parse_text(&self, text: &str) -> Vec<ErrorRecord> {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in text.lines() {
            let found = self.parse_line(line);
            if found.is_empty() && !line.trim().is_empty() {
                skipped += 1;
            }
            records.extend(found);
        }
        debug!(records = records.len(), skipped, "parsed error text");
        records
    }

    /// Parse the text of one document, failing when it holds no records.
    pub fn parse_document(&self, document: &str, text: &str) -> Result<Vec<ErrorRecord>, ReconError> {
        let records = self.parse_text(text);
        if records.is_empty() {
            return Err(ReconError::ExtractionEmpty {
                document: document.to_string(),
            });
        }
        Ok(records)
    }

    fn from_bracketed(&self, caps: &Captures<'_>) -> ErrorRecord {
        let combined = group(caps, "combined");
        // Identifiers are [A-Z0-9]+, so byte slicing stays on char boundaries.
        let (filer_code, entry) = if combined.len() > FILER_CODE_LEN {
            (&combined[..FILER_CODE_LEN], &combined[FILER_CODE_LEN..])
        } else {
            (combined, "")
        };

        ErrorRecord {
            error_code: caps.name("code").map(|m| format!("F{}", m.as_str())),
            error_description: group(caps, "desc").trim().to_string(),
            filer_code: filer_code.to_string(),
            entry_number: self.entry_or_fallback(entry, caps),
            line_number: group(caps, "line").to_string(),
        }
    }

    fn from_multi_token(&self, caps: &Captures<'_>) -> ErrorRecord {
        ErrorRecord {
            error_code: caps.name("code").map(|m| format!("F{}", m.as_str())),
            error_description: group(caps, "desc").trim().to_string(),
            filer_code: self.filer_prefix.clone(),
            entry_number: self.entry_or_fallback(group(caps, "entry"), caps),
            line_number: group(caps, "line").to_string(),
        }
    }

    /// Captured entry number, or the digits after the secondary marker
    /// anywhere in the matched span.
    fn entry_or_fallback(&self, captured: &str, caps: &Captures<'_>) -> String {
        if !captured.is_empty() {
            return captured.to_string();
        }
        let span = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        self.secondary
            .captures(span)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map(|m| m.as_str()).unwrap_or_default()
}

/// Concatenate per-document results in input order.
pub fn combine(documents: Vec<Vec<ErrorRecord>>) -> Result<Vec<ErrorRecord>, ReconError> {
    if documents.is_empty() {
        return Err(ReconError::NoInput);
    }
    Ok(documents.into_iter().flatten().collect())
}
