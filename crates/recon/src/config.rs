use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Matching rules: parser constants, spreadsheet header mapping, date
/// columns, entry-number aliases and the unmatched-row policy.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Business columns whose values are coerced to ISO dates.
    pub date_columns: Vec<String>,
    pub unmatched_policy: UnmatchedPolicy,
    pub patterns: PatternConfig,
    pub columns: ColumnMapping,
    pub aliases: Vec<KeyAlias>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            date_columns: default_date_columns(),
            unmatched_policy: UnmatchedPolicy::default(),
            patterns: PatternConfig::default(),
            columns: ColumnMapping::default(),
            aliases: Vec::new(),
        }
    }
}

fn default_date_columns() -> Vec<String> {
    [
        "Entry Date",
        "Entry Summary Date",
        "Import Date",
        "Arrival Date",
        "Release Date",
        "Export Date",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// Parser constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Filer prefix used by the multi-token layout, both as the filer code
    /// and as the marker in front of the entry number.
    pub filer_prefix: String,
    /// Marker searched inside a matched span when the entry number was not
    /// captured directly.
    pub secondary_marker: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            filer_prefix: "GU6".into(),
            secondary_marker: "GU6".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// External spreadsheet header names for the three key fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub filer_code: String,
    pub entry_number: String,
    pub line_number: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            filer_code: "Filer Code".into(),
            entry_number: "Entry Number".into(),
            line_number: "7501 Line Number".into(),
        }
    }
}

impl ColumnMapping {
    /// `(external header, canonical name)` pairs in key order.
    pub fn pairs(&self) -> [(&str, &'static str); 3] {
        [
            (self.filer_code.as_str(), crate::model::FILER_CODE),
            (self.entry_number.as_str(), crate::model::ENTRY_NUMBER),
            (self.line_number.as_str(), crate::model::LINE_NUMBER),
        ]
    }
}

// ---------------------------------------------------------------------------
// Aliases + policy
// ---------------------------------------------------------------------------

/// Error records carrying `sentinel` as entry number also match import rows
/// whose entry number is `real`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAlias {
    pub sentinel: String,
    pub real: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Unmatched error records are exported with empty import fields.
    #[default]
    Keep,
    /// The join fails with `NoMatches` when no error record matched at all.
    FailWhenEmpty,
}

impl std::fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::FailWhenEmpty => write!(f, "fail_when_empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let p = &self.patterns;
        if p.filer_prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "patterns.filer_prefix must not be empty".into(),
            ));
        }
        if p.filer_prefix.chars().any(char::is_whitespace) {
            return Err(ReconError::ConfigValidation(format!(
                "patterns.filer_prefix must not contain whitespace: {:?}",
                p.filer_prefix
            )));
        }
        if p.secondary_marker.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "patterns.secondary_marker must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (external, canonical) in self.columns.pairs() {
            if external.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{canonical} must not be empty"
                )));
            }
            if !seen.insert(external.trim()) {
                return Err(ReconError::ConfigValidation(format!(
                    "column '{external}' is mapped to more than one key field"
                )));
            }
        }

        let mut sentinels = HashSet::new();
        for alias in &self.aliases {
            let sentinel = alias.sentinel.trim();
            if sentinel.is_empty() || alias.real.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "alias sentinel and real entry numbers must not be empty".into(),
                ));
            }
            if sentinel == alias.real.trim() {
                return Err(ReconError::ConfigValidation(format!(
                    "alias '{sentinel}' points at itself"
                )));
            }
            if !sentinels.insert(sentinel) {
                return Err(ReconError::ConfigValidation(format!(
                    "alias sentinel '{sentinel}' is defined more than once"
                )));
            }
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
date_columns = ["Entry Date"]
unmatched_policy = "fail_when_empty"

[patterns]
filer_prefix = "AB1"
secondary_marker = "AB1"

[columns]
filer_code = "Filer"
entry_number = "Entry No"
line_number = "Line"

[[aliases]]
sentinel = "00000000"
real = "60061040"
"#;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.patterns.filer_prefix, "GU6");
        assert_eq!(config.columns.line_number, "7501 Line Number");
        assert_eq!(config.unmatched_policy, UnmatchedPolicy::Keep);
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert_eq!(config.patterns.filer_prefix, "AB1");
        assert_eq!(config.columns.entry_number, "Entry No");
        assert_eq!(config.date_columns, vec!["Entry Date".to_string()]);
        assert_eq!(config.unmatched_policy, UnmatchedPolicy::FailWhenEmpty);
        assert_eq!(
            config.aliases,
            vec![KeyAlias { sentinel: "00000000".into(), real: "60061040".into() }]
        );
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ReconConfig::from_toml("[columns]\nfiler_code = \"Filer\"\n").unwrap();
        assert_eq!(config.columns.filer_code, "Filer");
        assert_eq!(config.columns.entry_number, "Entry Number");
    }

    #[test]
    fn reject_empty_prefix() {
        let err = ReconConfig::from_toml("[patterns]\nfiler_prefix = \"  \"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_duplicate_column_mapping() {
        let toml = "[columns]\nfiler_code = \"Key\"\nentry_number = \"Key\"\n";
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("more than one key field"));
    }

    #[test]
    fn reject_self_alias() {
        let toml = "[[aliases]]\nsentinel = \"1\"\nreal = \"1\"\n";
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("points at itself"));
    }

    #[test]
    fn reject_duplicate_sentinel() {
        let toml = "[[aliases]]\nsentinel = \"1\"\nreal = \"2\"\n[[aliases]]\nsentinel = \"1\"\nreal = \"3\"\n";
        assert!(ReconConfig::from_toml(toml).is_err());
    }

    #[test]
    fn reject_unknown_policy() {
        let err = ReconConfig::from_toml("unmatched_policy = \"explode\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), config);
    }
}
