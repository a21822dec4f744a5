//! Bounding-box extraction from footprint overlays.
//!
//! Overlays come in two schema generations. Older documents use the KML 2.1
//! namespace with vertices in `LineString` elements; current ones use KML 2.2
//! with `LinearRing` elements. Each schema is tried in a fixed order and the
//! first one yielding any coordinate wins.

use std::fs;
use std::path::{Path, PathBuf};

use geo_types::Coord;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use super::error::{OverlayError, OverlayResult};
use super::writer::KML22_NAMESPACE;
use super::OVERLAY_PATTERN;
use crate::fsutil;
use crate::geometry::{BoundingBox, BufferDegrees};

const KML21_NAMESPACE: &str = "http://earth.google.com/kml/2.1";

/// Overlay schema variants, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySchema {
    /// KML 2.1, coordinates inside `LineString`.
    Kml21LineString,
    /// KML 2.2, coordinates inside `LinearRing`.
    Kml22LinearRing,
}

impl OverlaySchema {
    /// All variants in fallback order.
    pub const FALLBACK_ORDER: [OverlaySchema; 2] =
        [OverlaySchema::Kml21LineString, OverlaySchema::Kml22LinearRing];

    /// XML namespace of the schema.
    pub fn namespace(&self) -> &'static str {
        match self {
            OverlaySchema::Kml21LineString => KML21_NAMESPACE,
            OverlaySchema::Kml22LinearRing => KML22_NAMESPACE,
        }
    }

    /// Local name of the element whose `coordinates` child is read.
    pub fn container(&self) -> &'static str {
        match self {
            OverlaySchema::Kml21LineString => "LineString",
            OverlaySchema::Kml22LinearRing => "LinearRing",
        }
    }

    fn owns(&self, resolved: &ResolveResult<'_>) -> bool {
        match resolved {
            ResolveResult::Bound(Namespace(ns)) => *ns == self.namespace().as_bytes(),
            _ => false,
        }
    }

    /// Collect every `(lon, lat)` vertex this schema finds in `content`.
    fn collect(&self, content: &str) -> OverlayResult<Vec<Coord<f64>>> {
        let mut reader = NsReader::from_str(content);
        let container = self.container().as_bytes();

        let mut container_depth = 0usize;
        let mut in_coordinates = false;
        let mut text = String::new();
        let mut coords = Vec::new();

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| OverlayError::Xml(e.to_string()))?;

            match event {
                Event::Start(e) if self.owns(&resolved) => {
                    let local = e.local_name();
                    if local.as_ref() == container {
                        container_depth += 1;
                    } else if local.as_ref() == b"coordinates" && container_depth > 0 {
                        in_coordinates = true;
                        text.clear();
                    }
                }
                Event::End(e) if self.owns(&resolved) => {
                    let local = e.local_name();
                    if local.as_ref() == container {
                        container_depth = container_depth.saturating_sub(1);
                    } else if local.as_ref() == b"coordinates" && in_coordinates {
                        in_coordinates = false;
                        coords.extend(parse_coordinates(&text)?);
                    }
                }
                Event::Text(e) if in_coordinates => {
                    let unescaped = e.unescape().map_err(|e| OverlayError::Xml(e.to_string()))?;
                    text.push_str(&unescaped);
                }
                Event::CData(e) if in_coordinates => {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(coords)
    }
}

/// Parse a whitespace-separated list of `lon,lat[,alt]` tuples.
fn parse_coordinates(text: &str) -> OverlayResult<Vec<Coord<f64>>> {
    text.split_whitespace()
        .map(|tuple| {
            let parts: Vec<&str> = tuple.split(',').collect();
            if parts.len() < 2 || parts.len() > 3 {
                return Err(OverlayError::InvalidCoordinate(tuple.to_string()));
            }
            let lon: f64 = parts[0]
                .parse()
                .map_err(|_| OverlayError::InvalidCoordinate(tuple.to_string()))?;
            let lat: f64 = parts[1]
                .parse()
                .map_err(|_| OverlayError::InvalidCoordinate(tuple.to_string()))?;
            if !lon.is_finite() || !lat.is_finite() {
                return Err(OverlayError::InvalidCoordinate(tuple.to_string()));
            }
            Ok(Coord { x: lon, y: lat })
        })
        .collect()
}

/// Read every vertex from an overlay document.
///
/// Returns the schema that matched together with the coordinates, or `None`
/// when no schema yields a coordinate.
pub fn read_coordinates(
    content: &str,
) -> OverlayResult<Option<(OverlaySchema, Vec<Coord<f64>>)>> {
    for schema in OverlaySchema::FALLBACK_ORDER {
        let coords = schema.collect(content)?;
        if !coords.is_empty() {
            return Ok(Some((schema, coords)));
        }
    }
    Ok(None)
}

/// Buffered bounding box of every vertex in the overlay at `path`.
///
/// Bounds are rounded to one decimal place after buffering.
pub fn extract_bbox(path: &Path, buffer: BufferDegrees) -> OverlayResult<BoundingBox> {
    if !buffer.is_valid() {
        return Err(OverlayError::InvalidBuffer {
            lat: buffer.lat,
            lon: buffer.lon,
        });
    }

    let content = fs::read_to_string(path).map_err(|e| OverlayError::io(path, e))?;
    let (schema, coords) = read_coordinates(&content)?
        .ok_or_else(|| OverlayError::NoFeaturesFound(path.to_path_buf()))?;

    debug!(
        path = %path.display(),
        ?schema,
        vertices = coords.len(),
        "Parsed overlay coordinates"
    );

    BoundingBox::from_coords(coords)
        .map(|raw| raw.buffered(buffer))
        .ok_or_else(|| OverlayError::NoFeaturesFound(path.to_path_buf()))
}

/// Latest overlay in `dir`, by file name.
///
/// Overlay names embed their date, so the lexically greatest name is the
/// newest.
pub fn find_overlay(dir: &Path) -> OverlayResult<PathBuf> {
    fsutil::matching_files(dir, OVERLAY_PATTERN)
        .map_err(|e| OverlayError::io(dir, e))?
        .pop()
        .ok_or_else(|| OverlayError::NoOverlay(dir.to_path_buf()))
}
