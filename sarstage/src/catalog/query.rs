//! Translation of acquisition requests into catalog queries.

use chrono::{DateTime, NaiveTime, Utc};

use super::error::{CatalogError, CatalogResult};
use super::types::AcquisitionRequest;
use crate::geometry::aoi;

/// Normalized, validated catalog search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub platform_code: &'static str,
    pub max_results: u32,
    pub start: DateTime<Utc>,
    /// Inclusive end of the search window (last second of the end date).
    pub end: DateTime<Utc>,
    pub product_level_code: &'static str,
    pub aoi_wkt: String,
}

/// Build a catalog query from an acquisition request.
///
/// Pure transform: validates the request and normalizes the AOI, but does no
/// I/O. Fails with [`CatalogError::InvalidRequest`] on an unmapped platform,
/// non-positive limits, an inverted date range or an unparseable AOI.
pub fn plan_query(request: &AcquisitionRequest) -> CatalogResult<CatalogQuery> {
    let platform_code = request.platform.catalog_code().ok_or_else(|| {
        CatalogError::InvalidRequest(format!(
            "platform {} is not served by the catalog",
            request.platform
        ))
    })?;

    if request.max_results <= 0 {
        return Err(CatalogError::InvalidRequest(format!(
            "max_results must be positive, got {}",
            request.max_results
        )));
    }
    let max_results = u32::try_from(request.max_results).map_err(|_| {
        CatalogError::InvalidRequest(format!("max_results {} is too large", request.max_results))
    })?;

    if request.parallelism <= 0 {
        return Err(CatalogError::InvalidRequest(format!(
            "parallelism must be positive, got {}",
            request.parallelism
        )));
    }

    if request.start_date > request.end_date {
        return Err(CatalogError::InvalidRequest(format!(
            "start date {} is after end date {}",
            request.start_date, request.end_date
        )));
    }

    let polygon = aoi::parse_polygon(&request.aoi_wkt)
        .map_err(|e| CatalogError::InvalidRequest(format!("area of interest: {}", e)))?;

    let start = request.start_date.and_time(NaiveTime::MIN).and_utc();
    let end = request
        .end_date
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CatalogError::InvalidRequest("end date out of range".to_string()))?;

    Ok(CatalogQuery {
        platform_code,
        max_results,
        start,
        end,
        product_level_code: request.product_kind.level_code(),
        aoi_wkt: aoi::to_wkt(&polygon),
    })
}
