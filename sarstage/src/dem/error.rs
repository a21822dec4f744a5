//! Error types for elevation acquisition.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for elevation acquisition.
pub type DemResult<T> = Result<T, DemError>;

/// Failure reported by an [`ElevationFetcher`](super::ElevationFetcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The user interrupted the fetch.
    #[error("interrupted by user")]
    Interrupted,

    /// The fetch failed.
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while acquiring an elevation tile.
#[derive(Debug, Error)]
pub enum DemError {
    /// The user interrupted the external tool.
    #[error("elevation download interrupted by user")]
    Interrupted,

    /// The external tool failed.
    #[error("elevation download failed: {0}")]
    FetchFailed(String),

    /// The external tool succeeded but produced no output files.
    #[error("no files matching {pattern} were created in {}", dir.display())]
    MissingArtifacts { pattern: String, dir: PathBuf },

    /// Unrecognized data source name.
    #[error("unknown elevation data source '{0}' (expected COP or NASA)")]
    UnknownDataSource(String),

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DemError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<FetchError> for DemError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Interrupted => DemError::Interrupted,
            FetchError::Failed(msg) => DemError::FetchFailed(msg),
        }
    }
}
