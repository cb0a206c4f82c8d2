// Upload storage and artifact naming inside the upload directory

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::IoError;

/// `YYYYmmdd_HHMMSS`, used as the prefix of stored uploads and artifacts.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const OUTPUT_PREFIX: &str = "processed_data_";

/// True when `filename` has an extension in `allowed` (case-insensitive).
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

pub fn check_extension(filename: &str, allowed: &[String]) -> Result<(), IoError> {
    if allowed_file(filename, allowed) {
        Ok(())
    } else {
        Err(IoError::InvalidFileType {
            file: filename.to_string(),
            allowed: allowed.to_vec(),
        })
    }
}

/// Reduce a client-supplied name to a safe single path component: ASCII
/// letters, digits, `_`, `.` and `-` only, whitespace runs become `_`, no
/// leading or trailing dots/underscores.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

pub fn timestamped_name(filename: &str, at: DateTime<Local>) -> String {
    let secure = secure_filename(filename);
    let secure = if secure.is_empty() { "upload".to_string() } else { secure };
    format!("{}_{}", at.format(TIMESTAMP_FORMAT), secure)
}

pub fn output_file_name(at: DateTime<Local>) -> String {
    format!("{OUTPUT_PREFIX}{}.xlsx", at.format(TIMESTAMP_FORMAT))
}

/// `dir/name`, or `dir/stem_N.ext` with the first free `N` when taken.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Store uploaded bytes under a timestamped, sanitized name in `dir`.
pub fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, IoError> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;
    let path = unique_path(dir, &timestamped_name(filename, Local::now()));
    std::fs::write(&path, bytes).map_err(|e| IoError::write(&path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved upload");
    Ok(path)
}

/// Resolve a bare file name to an existing file directly inside `dir`.
/// Names with separators, parent references or a leading dot resolve to
/// nothing.
pub fn resolve_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return None;
    }
    let path = dir.join(name);
    path.is_file().then_some(path)
}
