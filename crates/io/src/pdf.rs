// PDF text extraction via poppler's pdftotext

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::IoError;

/// Separator line placed between pages of one document.
pub const PAGE_SEPARATOR: &str = "\n\u{000C}\n";

/// Turns a document on disk into one text blob.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, IoError>;
}

/// Runs `pdftotext -layout <file> -` and captures stdout.
#[derive(Debug, Clone, Default)]
pub struct Pdftotext;

impl TextExtractor for Pdftotext {
    fn extract(&self, path: &Path) -> Result<String, IoError> {
        which::which("pdftotext").map_err(|_| IoError::ToolMissing {
            tool: "pdftotext (poppler-utils)".to_string(),
            hint: "Install with: apt install poppler-utils / brew install poppler".to_string(),
        })?;

        let file = display_name(path);
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| IoError::Extraction {
                file: file.clone(),
                reason: format!("failed to run pdftotext: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IoError::Extraction {
                file,
                reason: format!(
                    "pdftotext failed (exit {}): {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        let text = join_pages(&String::from_utf8_lossy(&output.stdout));
        if text.trim().is_empty() {
            return Err(IoError::Extraction {
                file,
                reason: "PDF appears scanned/image-only, no text layer".to_string(),
            });
        }

        debug!(file = %file, bytes = text.len(), "extracted pdf text");
        Ok(text)
    }
}

/// pdftotext ends every page with a bare form feed; put each page break on
/// its own line so no report line straddles two pages.
pub fn join_pages(raw: &str) -> String {
    raw.split('\u{000C}')
        .map(|page| page.trim_end_matches('\n'))
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
