//! Footprint overlays.
//!
//! A search result set is persisted as a single KML document holding one
//! polygon placemark per product (`writer`). A later invocation reads the
//! document back to derive the area of interest for the elevation step
//! (`reader`).

mod error;
mod reader;
mod writer;

pub use error::{OverlayError, OverlayResult};
pub use reader::{extract_bbox, find_overlay, read_coordinates, OverlaySchema};
pub use writer::{export_footprints, export_footprints_dated, overlay_file_name};

/// File-name pattern of overlay documents.
pub const OVERLAY_PATTERN: &str = "*.kml";
