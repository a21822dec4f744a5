//! Configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a project file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid INI.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A required key is absent or empty.
    #[error("missing required key '{key}' in [{section}]")]
    Missing { section: &'static str, key: String },

    /// A key holds a value that cannot be used.
    #[error("invalid value '{value}' for '{key}' in [{section}]: {reason}")]
    Invalid {
        section: &'static str,
        key: String,
        value: String,
        reason: String,
    },
}
