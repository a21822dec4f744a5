//! Error types for the overlay module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors raised while writing or reading footprint overlays.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A product footprint is not a polygon; nothing was written.
    #[error("footprint of {id} is a {kind}, not a Polygon")]
    UnsupportedGeometry { id: String, kind: &'static str },

    /// Neither schema variant yielded a coordinate.
    #[error("no features found in {}", .0.display())]
    NoFeaturesFound(PathBuf),

    /// A coordinate tuple could not be parsed.
    #[error("invalid coordinate tuple '{0}'")]
    InvalidCoordinate(String),

    /// A buffer margin was negative or not finite.
    #[error("invalid buffer: lat {lat}, lon {lon} (must be >= 0)")]
    InvalidBuffer { lat: f64, lon: f64 },

    /// No overlay document exists in the directory.
    #[error("no overlay file found in {}; run the download command first", .0.display())]
    NoOverlay(PathBuf),

    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OverlayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
