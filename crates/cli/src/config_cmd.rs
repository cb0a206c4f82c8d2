//! `entrymatch config`: inspect and check settings files.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use entrymatch_config::Settings;

use crate::{load_settings, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings as TOML
    #[command(after_help = "\
Examples:
  entrymatch config show
  entrymatch config show > ~/.config/entrymatch/config.toml
  entrymatch --config team.toml config show")]
    Show,

    /// Check a settings file without running anything
    #[command(after_help = "\
Examples:
  entrymatch config validate
  entrymatch config validate team.toml")]
    Validate {
        /// Settings file (default: --config, then the standard location)
        file: Option<PathBuf>,
    },

    /// Print the default settings file location
    Path,
}

pub fn cmd_config(config: Option<&Path>, cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Show => {
            let settings = load_settings(config)?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Validate { file } => {
            let target = file.as_deref().or(config);
            let settings = load_settings(target)?;
            let shown = target
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| Settings::config_path().display().to_string());
            println!("ok: {shown}");
            println!(
                "  {} alias(es), unmatched policy {}, filer prefix {}",
                settings.recon.aliases.len(),
                settings.recon.unmatched_policy,
                settings.recon.patterns.filer_prefix
            );
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", Settings::config_path().display());
            Ok(())
        }
    }
}
