//! ASF search API client.
//!
//! Implements [`CatalogClient`] against the ASF search service. Searches use
//! the public GeoJSON endpoint; downloads are authenticated with an Earthdata
//! bearer token and spread across worker threads that share one queue.

mod http;

pub use http::HttpDownloader;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use chrono::SecondsFormat;
use geo_types::Geometry;
use geojson::{Feature, GeoJson};
use reqwest::blocking::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{CatalogError, CatalogResult, TransferError};
use super::query::CatalogQuery;
use super::types::CatalogProduct;
use super::CatalogClient;

/// Default ASF search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://api.daac.asf.alaska.edu/services/search/param";

/// Default timeout for search requests and download reads.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Catalog client for the Alaska Satellite Facility.
#[derive(Debug, Clone)]
pub struct AsfCatalog {
    search_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl AsfCatalog {
    /// Create a client; `token` is the Earthdata bearer token used for downloads.
    pub fn new(token: Option<String>) -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a different search endpoint.
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a download token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl CatalogClient for AsfCatalog {
    fn search(&self, query: &CatalogQuery) -> CatalogResult<Vec<CatalogProduct>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CatalogError::Search(e.to_string()))?;

        let max_results = query.max_results.to_string();
        let start = query.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = query.end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let params = [
            ("platform", query.platform_code),
            ("processingLevel", query.product_level_code),
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("intersectsWith", query.aoi_wkt.as_str()),
            ("maxResults", max_results.as_str()),
            ("output", "geojson"),
        ];

        debug!(url = %self.search_url, ?params, "Sending catalog search");
        let response = client
            .get(&self.search_url)
            .query(&params)
            .send()
            .map_err(|e| CatalogError::Search(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Search(format!(
                "search request failed with status {}",
                status
            )));
        }

        let body = response
            .text()
            .map_err(|e| CatalogError::Search(format!("incomplete response: {}", e)))?;
        let products = parse_search_response(&body)?;
        info!(count = products.len(), "Catalog search complete");
        Ok(products)
    }

    fn download(
        &self,
        products: &[CatalogProduct],
        destination: &Path,
        parallelism: usize,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        let token = self.token.as_deref().ok_or_else(|| {
            TransferError::Authentication("no Earthdata token configured".to_string())
        })?;
        let downloader = HttpDownloader::new(self.timeout, token)?;
        let results = drain_queue(products, parallelism, cancel, |product| {
            downloader.download(product, destination, cancel)
        });

        match most_severe(results) {
            Some(err) => {
                warn!(error = %err, "Download failed");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// Run `fetch` over `products` with `workers` threads pulling from one queue.
///
/// A worker takes the next product as soon as it finishes its current one.
/// After the first failure or a cancellation no new product is started.
fn drain_queue<F>(
    products: &[CatalogProduct],
    workers: usize,
    cancel: &CancellationToken,
    fetch: F,
) -> Vec<Result<u64, TransferError>>
where
    F: Fn(&CatalogProduct) -> Result<u64, TransferError> + Sync,
{
    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let workers = workers.max(1).min(products.len());

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let (next, failed, fetch) = (&next, &failed, &fetch);
                scope.spawn(move || {
                    let mut results = Vec::new();
                    while !failed.load(Ordering::SeqCst) {
                        if cancel.is_cancelled() {
                            results.push(Err(TransferError::Cancelled));
                            break;
                        }
                        let Some(product) = products.get(next.fetch_add(1, Ordering::SeqCst))
                        else {
                            break;
                        };
                        let result = fetch(product);
                        if result.is_err() {
                            failed.store(true, Ordering::SeqCst);
                        }
                        results.push(result);
                    }
                    results
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| {
                h.join().unwrap_or_else(|_| {
                    vec![Err(TransferError::Connection("download worker panicked".to_string()))]
                })
            })
            .collect()
    })
}

/// Pick the error that decides the outcome of a transfer.
///
/// Authentication failures win over cancellation, which wins over
/// connection errors.
fn most_severe(results: Vec<Result<u64, TransferError>>) -> Option<TransferError> {
    results
        .into_iter()
        .filter_map(Result::err)
        .max_by_key(|err| match err {
            TransferError::Authentication(_) => 2,
            TransferError::Cancelled => 1,
            TransferError::Connection(_) => 0,
        })
}

/// Parse a GeoJSON search response into products.
pub fn parse_search_response(body: &str) -> CatalogResult<Vec<CatalogProduct>> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e| CatalogError::Search(format!("invalid GeoJSON response: {}", e)))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            collection.features.into_iter().map(parse_feature).collect()
        }
        _ => Err(CatalogError::Search(
            "response is not a FeatureCollection".to_string(),
        )),
    }
}

fn parse_feature(feature: Feature) -> CatalogResult<CatalogProduct> {
    let string_property = |name: &str| -> CatalogResult<String> {
        feature
            .property(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| CatalogError::MalformedProduct(format!("missing '{}'", name)))
    };

    let id = string_property("fileID")?;
    let file_name = string_property("fileName")?;
    let url = string_property("url")?;
    let expected_bytes = feature
        .property("bytes")
        .and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().map(|f| f as u64))
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        })
        .ok_or_else(|| CatalogError::MalformedProduct(format!("{}: missing 'bytes'", id)))?;

    let geometry = feature
        .geometry
        .ok_or_else(|| CatalogError::MalformedProduct(format!("{}: missing geometry", id)))?;
    let footprint = Geometry::<f64>::try_from(geometry)
        .map_err(|e| CatalogError::MalformedProduct(format!("{}: {}", id, e)))?;

    Ok(CatalogProduct {
        id,
        footprint,
        expected_bytes,
        file_name,
        url,
    })
}
