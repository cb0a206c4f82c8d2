// Application settings
// Loaded from ~/.config/entrymatch/config.toml

use std::fs;
use std::path::{Path, PathBuf};

use entrymatch_recon::{ReconConfig, ReconError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 100 MB, the largest accepted upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SettingsError {
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

    #[error("invalid config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Recon(#[from] ReconError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where uploads and generated workbooks are stored.
    pub upload_dir: PathBuf,

    /// Per-file size limit in bytes.
    pub max_upload_bytes: u64,

    /// Accepted error-report extensions.
    pub pdf_extensions: Vec<String>,

    /// Accepted import-record extensions.
    pub spreadsheet_extensions: Vec<String>,

    /// Parser constants, column mapping, aliases and join policy.
    pub recon: ReconConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pdf_extensions: vec!["pdf".into()],
            spreadsheet_extensions: vec!["xlsx".into(), "xls".into()],
            recon: ReconConfig::default(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("entrymatch").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("entrymatch")
            .join("config.toml")
    }

    /// Load settings from `explicit`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&contents).map_err(|e| match e {
            SettingsError::Invalid(message) => SettingsError::Parse { path: path.clone(), message },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| SettingsError::Invalid(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid(
                "max_upload_bytes must be greater than zero".into(),
            ));
        }
        for (name, list) in [
            ("pdf_extensions", &self.pdf_extensions),
            ("spreadsheet_extensions", &self.spreadsheet_extensions),
        ] {
            if list.is_empty() {
                return Err(SettingsError::Invalid(format!("{name} must not be empty")));
            }
            if let Some(bad) = list.iter().find(|e| e.is_empty() || e.contains('.')) {
                return Err(SettingsError::Invalid(format!(
                    "{name}: '{bad}' must be a bare extension such as \"xlsx\""
                )));
            }
        }
        self.recon.validate()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    /// Save current settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_toml()?).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
