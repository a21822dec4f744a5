//! CLI error type.

use std::fmt;

use sarstage::config::ConfigError;
use sarstage::logging::LoggingError;
use sarstage::overlay::OverlayError;
use sarstage::pipeline::PipelineError;

/// Errors that end a CLI command with a non-zero exit status.
#[derive(Debug)]
pub enum CliError {
    /// The project file could not be loaded.
    Config(ConfigError),
    /// A pipeline step failed.
    Pipeline(PipelineError),
    /// An overlay could not be read.
    Overlay(OverlayError),
    /// Logging could not be installed.
    Logging(LoggingError),
    /// The async runtime or signal handler could not be set up.
    Runtime(String),
    /// The transfer failed after it started.
    TransferFailed(String),
    /// The user interrupted the command.
    Interrupted,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::Overlay(e) => write!(f, "Overlay error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::TransferFailed(msg) => write!(f, "Download failed: {}", msg),
            CliError::Interrupted => write!(f, "Interrupted by user"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Overlay(e) => Some(e),
            CliError::Logging(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<OverlayError> for CliError {
    fn from(e: OverlayError) -> Self {
        CliError::Overlay(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
