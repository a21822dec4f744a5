//! Request and product types shared by the catalog pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use geo_types::Geometry;

use super::error::CatalogError;

/// Acquisition platform selectable in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Both Sentinel-1 satellites.
    Sentinel1,
    /// Sentinel-1A only.
    Sentinel1A,
    /// Sentinel-1B only.
    Sentinel1B,
    /// SkySAR; accepted in configuration but not served by the catalog.
    SkySar,
}

impl Platform {
    /// Catalog code for this platform, if the catalog serves it.
    pub fn catalog_code(&self) -> Option<&'static str> {
        match self {
            Platform::Sentinel1 => Some("SENTINEL-1"),
            Platform::Sentinel1A => Some("SA"),
            Platform::Sentinel1B => Some("SB"),
            Platform::SkySar => None,
        }
    }

    /// Configuration name of this platform.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Sentinel1 => "SENTINEL-1",
            Platform::Sentinel1A => "SENTINEL-1A",
            Platform::Sentinel1B => "SENTINEL-1B",
            Platform::SkySar => "SKYSAR",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SENTINEL-1" | "SENTINEL1" => Ok(Platform::Sentinel1),
            "SENTINEL-1A" | "S1A" => Ok(Platform::Sentinel1A),
            "SENTINEL-1B" | "S1B" => Ok(Platform::Sentinel1B),
            "SKYSAR" => Ok(Platform::SkySar),
            other => Err(CatalogError::InvalidRequest(format!(
                "unknown platform '{}'",
                other
            ))),
        }
    }
}

/// Kind of product to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductKind {
    /// Full single-look complex scene.
    #[default]
    Standard,
    /// Single sub-swath burst.
    Subswath,
}

impl ProductKind {
    /// Catalog processing-level code. The two kinds never share a code.
    pub fn level_code(&self) -> &'static str {
        match self {
            ProductKind::Standard => "SLC",
            ProductKind::Subswath => "BURST",
        }
    }

    /// File-name pattern of downloaded payloads of this kind.
    pub fn file_pattern(&self) -> &'static str {
        match self {
            ProductKind::Standard => "*.zip",
            ProductKind::Subswath => "*.tiff",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.level_code())
    }
}

/// Typed parameters of one acquisition run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionRequest {
    pub platform: Platform,
    pub product_kind: ProductKind,
    /// Area of interest as a WKT polygon.
    pub aoi_wkt: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_results: i64,
    /// Number of concurrent transfers handed to the catalog client.
    pub parallelism: i64,
}

/// A product returned by a catalog search.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    /// Catalog identifier, used as the overlay feature name.
    pub id: String,
    /// Ground footprint in lon/lat.
    pub footprint: Geometry<f64>,
    /// Size of the payload file in bytes.
    pub expected_bytes: u64,
    /// Name of the payload file once downloaded.
    pub file_name: String,
    /// Download location, opaque outside the catalog client.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("SENTINEL-1".parse::<Platform>().unwrap(), Platform::Sentinel1);
        assert_eq!("sentinel-1a".parse::<Platform>().unwrap(), Platform::Sentinel1A);
        assert_eq!(" SkySar ".parse::<Platform>().unwrap(), Platform::SkySar);
        assert!("LANDSAT-8".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_codes() {
        assert_eq!(Platform::Sentinel1.catalog_code(), Some("SENTINEL-1"));
        assert_eq!(Platform::SkySar.catalog_code(), None);
    }

    #[test]
    fn test_product_kind_codes_are_exclusive() {
        assert_ne!(
            ProductKind::Standard.level_code(),
            ProductKind::Subswath.level_code()
        );
        assert_eq!(ProductKind::Standard.file_pattern(), "*.zip");
        assert_eq!(ProductKind::Subswath.file_pattern(), "*.tiff");
    }
}
