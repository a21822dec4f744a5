//! Geometry helpers for areas of interest.
//!
//! Provides polygon envelopes, buffered bounding boxes, outward alignment to
//! whole degrees and the hemisphere-labelled tile names used by the elevation
//! step. Everything in here is pure.

mod tile_name;
pub mod aoi;

pub use tile_name::{format_bbox, ElevationTileName};

use geo::BoundingRect;
use geo_types::{Coord, MultiPoint, Polygon};

/// Default buffer applied around a footprint envelope, in degrees.
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.5;

/// Latitude/longitude buffer applied around a raw envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferDegrees {
    /// Degrees subtracted from south and added to north.
    pub lat: f64,
    /// Degrees subtracted from west and added to east.
    pub lon: f64,
}

impl Default for BufferDegrees {
    fn default() -> Self {
        Self {
            lat: DEFAULT_BUFFER_DEGREES,
            lon: DEFAULT_BUFFER_DEGREES,
        }
    }
}

impl BufferDegrees {
    /// Create a buffer with explicit latitude and longitude margins.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// A zero buffer.
    pub fn none() -> Self {
        Self { lat: 0.0, lon: 0.0 }
    }

    /// Whether both margins are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat >= 0.0 && self.lon >= 0.0
    }
}

/// Rectangular area of interest in degrees (SNWE).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Create a bounding box from south/north/west/east bounds.
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Envelope of a set of (lon, lat) coordinates.
    ///
    /// Returns `None` for an empty set.
    pub fn from_coords(coords: Vec<Coord<f64>>) -> Option<Self> {
        let points: MultiPoint<f64> = coords.into_iter().collect();
        points.bounding_rect().map(|rect| Self {
            south: rect.min().y,
            north: rect.max().y,
            west: rect.min().x,
            east: rect.max().x,
        })
    }

    /// Apply a buffer and round every bound to one decimal place.
    pub fn buffered(&self, buffer: BufferDegrees) -> Self {
        Self {
            south: round_to_tenth(self.south - buffer.lat),
            north: round_to_tenth(self.north + buffer.lat),
            west: round_to_tenth(self.west - buffer.lon),
            east: round_to_tenth(self.east + buffer.lon),
        }
    }

    /// Round outward to whole degrees.
    pub fn align_outward(&self) -> AlignedBoundingBox {
        AlignedBoundingBox {
            west: self.west.floor() as i32,
            south: self.south.floor() as i32,
            east: self.east.ceil() as i32,
            north: self.north.ceil() as i32,
        }
    }

    /// Render as `SNWE: <south> <north> <west> <east>`.
    pub fn to_snwe_string(&self) -> String {
        format!(
            "SNWE: {} {} {} {}",
            self.south, self.north, self.west, self.east
        )
    }
}

/// Bounding box aligned to whole-degree boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlignedBoundingBox {
    pub west: i32,
    pub south: i32,
    pub east: i32,
    pub north: i32,
}

impl AlignedBoundingBox {
    /// Bounds in left, bottom, right, top order.
    pub fn as_wsen(&self) -> [i32; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Hemisphere-labelled name for this box.
    pub fn tile_name(&self) -> ElevationTileName {
        ElevationTileName::from_aligned(self)
    }
}

/// Envelope of a polygon's exterior ring.
pub fn envelope(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    BoundingBox::from_coords(polygon.exterior().coords().copied().collect())
}

/// Halves round to even, so 0.25 becomes 0.2 and -0.05 becomes -0.0.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
