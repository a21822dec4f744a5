//! Hemisphere-labelled names for whole-degree bounding boxes.

use std::fmt;

use super::AlignedBoundingBox;

/// Deterministic label of an aligned bounding box, e.g. `S01_N01_W078_W076`.
///
/// The order is south, north, west, east. Latitudes are zero-padded to two
/// digits and longitudes to three. The name doubles as the idempotency key of
/// an elevation acquisition directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElevationTileName(String);

impl ElevationTileName {
    /// Name an aligned bounding box.
    pub fn from_aligned(bbox: &AlignedBoundingBox) -> Self {
        Self(format_bbox(bbox.as_wsen()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used for the elevation raster of this tile.
    pub fn output_name(&self) -> String {
        format!("elevation_{}.dem.wgs84", self.0)
    }
}

impl fmt::Display for ElevationTileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format a `[west, south, east, north]` box as `SXX_NXX_WXXX_EXXX`.
pub fn format_bbox(wsen: [i32; 4]) -> String {
    let [west, south, east, north] = wsen;
    format!(
        "{}_{}_{}_{}",
        latitude_label(south),
        latitude_label(north),
        longitude_label(west),
        longitude_label(east)
    )
}

fn latitude_label(lat: i32) -> String {
    let hemisphere = if lat < 0 { 'S' } else { 'N' };
    format!("{}{:02}", hemisphere, lat.unsigned_abs())
}

fn longitude_label(lon: i32) -> String {
    let hemisphere = if lon < 0 { 'W' } else { 'E' };
    format!("{}{:03}", hemisphere, lon.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_positive_coordinates() {
        assert_eq!(format_bbox([10, 20, 15, 25]), "N20_N25_E010_E015");
    }

    #[test]
    fn test_all_negative_coordinates() {
        assert_eq!(format_bbox([-80, -10, -75, -5]), "S10_S05_W080_W075");
    }

    #[test]
    fn test_mixed_coordinates() {
        assert_eq!(format_bbox([-78, -1, -76, 1]), "S01_N01_W078_W076");
    }

    #[test]
    fn test_zero_is_north_and_east() {
        assert_eq!(format_bbox([0, 0, 5, 5]), "N00_N05_E000_E005");
    }

    #[test]
    fn test_three_digit_longitudes() {
        assert_eq!(format_bbox([-120, -45, -100, -30]), "S45_S30_W120_W100");
    }

    #[test]
    fn test_output_name() {
        let bbox = AlignedBoundingBox {
            west: -79,
            south: -2,
            east: -75,
            north: 2,
        };
        let name = bbox.tile_name();
        assert_eq!(name.to_string(), "S02_N02_W079_W075");
        assert_eq!(name.output_name(), "elevation_S02_N02_W079_W075.dem.wgs84");
    }
}
