// entrymatch CLI - reconcile customs error reports against import records

mod config_cmd;
mod pipeline;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use entrymatch_cli::exit_codes::{
    io_exit_code, recon_exit_code, service_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS,
    EXIT_USAGE,
};
use entrymatch_cli::ServiceError;
use entrymatch_config::{Settings, SettingsError};
use entrymatch_io::IoError;
use entrymatch_recon::ReconError;
use tracing_subscriber::EnvFilter;

use config_cmd::ConfigCommands;

#[derive(Parser)]
#[command(name = "entrymatch")]
#[command(about = "Match customs error-report PDFs against an import-record spreadsheet")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: <config dir>/entrymatch/config.toml)
    #[arg(long, global = true, env = "ENTRYMATCH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract errors from PDFs, match them to import records, write a workbook
    #[command(after_help = "\
Examples:
  entrymatch run --pdf errors.pdf --import imports.xlsx
  entrymatch run --pdf jan.pdf --pdf feb.pdf --import imports.xlsx --out matched.xlsx
  entrymatch run --pdf errors.pdf --import imports.xlsx --json")]
    Run {
        /// Error-report PDF (repeatable)
        #[arg(long = "pdf", value_name = "FILE", required = true, num_args = 1..)]
        pdfs: Vec<PathBuf>,

        /// Import-record spreadsheet
        #[arg(long, value_name = "FILE")]
        import: PathBuf,

        /// Copy the result workbook here as well
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress stderr progress lines
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Extract error records from PDFs without matching
    #[command(after_help = "\
Examples:
  entrymatch parse errors.pdf
  entrymatch parse jan.pdf feb.pdf --format json
  entrymatch parse errors.pdf --format xlsx --out errors.xlsx")]
    Parse {
        /// Error-report PDFs, combined in the order given
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "csv")]
        format: TableFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Validate and clean an import-record spreadsheet
    #[command(after_help = "\
Examples:
  entrymatch normalize imports.xlsx
  entrymatch normalize imports.csv --format json
  entrymatch normalize imports.xls --format xlsx --out clean.xlsx")]
    Normalize {
        /// Spreadsheet (xlsx, xlsm, xls, xlsb, ods or csv)
        file: PathBuf,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "csv")]
        format: TableFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Show or validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Csv,
    Json,
    Xlsx,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  entrymatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: entrymatch <command> [options]");
            eprintln!("       entrymatch --help for more information");
            Ok(())
        }
        Some(Commands::Run { pdfs, import, out, json, quiet }) => {
            pipeline::cmd_run(cli.config.as_deref(), pdfs, import, out, json, quiet)
        }
        Some(Commands::Parse { pdfs, format, out }) => {
            pipeline::cmd_parse(cli.config.as_deref(), pdfs, format, out)
        }
        Some(Commands::Normalize { file, format, out }) => {
            pipeline::cmd_normalize(cli.config.as_deref(), file, format, out)
        }
        Some(Commands::Config { command }) => config_cmd::cmd_config(cli.config.as_deref(), command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Already reported (e.g. as JSON on stderr); exit quietly with `code`.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        Self {
            code: service_exit_code(&err),
            hint: err.hint().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        Self { code: recon_exit_code(&err), message: err.to_string(), hint: None }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        Self {
            code: io_exit_code(&err),
            hint: err.hint().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        let code = match &err {
            SettingsError::Read { .. } | SettingsError::Write { .. } => EXIT_IO,
            _ => EXIT_CONFIG,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

/// Load settings for a command, honouring `--config`.
pub fn load_settings(config: Option<&std::path::Path>) -> Result<Settings, CliError> {
    Settings::load(config).map_err(|e| {
        CliError::from(e).with_hint(format!(
            "check the file, or run `entrymatch config show` for defaults ({})",
            Settings::config_path().display()
        ))
    })
}
