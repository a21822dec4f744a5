//! Area-of-interest polygons in WKT.
//!
//! Parsing and serialization are delegated to the `wkt` crate; this module
//! only narrows the result to a single non-empty polygon.

use geo_types::{Geometry, Polygon};
use thiserror::Error;
use wkt::{ToWkt, TryFromWkt};

/// Errors raised while reading an area of interest.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AoiError {
    /// The text is not valid WKT.
    #[error("invalid WKT: {0}")]
    Invalid(String),

    /// Valid WKT, but not a polygon.
    #[error("expected a POLYGON, got a {0}")]
    NotAPolygon(&'static str),

    /// The polygon has fewer than three distinct exterior positions.
    #[error("polygon is empty or degenerate")]
    Empty,
}

/// Parse a WKT `POLYGON`.
pub fn parse_polygon(input: &str) -> Result<Polygon<f64>, AoiError> {
    let geometry = Geometry::<f64>::try_from_wkt_str(input.trim())
        .map_err(|e| AoiError::Invalid(e.to_string()))?;

    let polygon = match geometry {
        Geometry::Polygon(polygon) => polygon,
        other => return Err(AoiError::NotAPolygon(kind(&other))),
    };

    // The exterior is closed, so its last position repeats the first.
    if polygon.exterior().0.len() < 4 {
        return Err(AoiError::Empty);
    }
    Ok(polygon)
}

/// Serialize a polygon back to normalized WKT.
pub fn to_wkt(polygon: &Polygon<f64>) -> String {
    polygon.wkt_string()
}

fn kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) => "LINE",
        Geometry::LineString(_) => "LINESTRING",
        Geometry::Polygon(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        Geometry::Rect(_) => "RECT",
        Geometry::Triangle(_) => "TRIANGLE",
    }
}
