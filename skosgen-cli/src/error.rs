use colored::Colorize;
use skosgen_core::{CleanError, ConfigError, PipelineError};
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Configuration file or value problems.
    Config(String),
    /// Unreadable or unwritable files.
    Input(String),
    /// Argument / usage errors.
    Usage(String),
    /// A build run that could not complete.
    Build(PipelineError),
    /// Cleaning an existing file failed.
    Clean(CleanError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(
                f,
                "{} {msg}\n  {} run 'skosgen init' to write a default skosgen.toml",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Build(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Clean(e) => write!(f, "{} {e}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Config(e) => CliError::from(e),
            other => CliError::Build(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CleanError> for CliError {
    fn from(e: CleanError) -> Self {
        CliError::Clean(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON encoding error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
