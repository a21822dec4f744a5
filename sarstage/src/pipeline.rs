//! End-to-end pipelines behind the CLI commands.
//!
//! `run_download` plans the query, searches, exports footprints, clears
//! truncated files and transfers the products. `run_dem` reads the latest
//! overlay back and acquires the elevation tile covering it.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::catalog::{plan_query, CatalogClient, CatalogError, CatalogProduct};
use crate::config::ProjectConfig;
use crate::dem::{self, DemError, DemOutcome, ElevationFetcher, GuardState};
use crate::geometry::BoundingBox;
use crate::overlay::{self, OverlayError};
use crate::transfer::{
    remove_incomplete, DownloadOrchestrator, ProgressCallback, TransferOutcome, TransferState,
    TransferStatus,
};

/// Errors that end a pipeline before its final step.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error(transparent)]
    Dem(#[from] DemError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A background task failed to run.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Result of the download pipeline.
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    /// Number of products the search returned.
    pub products: usize,
    /// Overlay written for the result set.
    pub overlay: PathBuf,
    /// Truncated files removed before the transfer.
    pub removed: usize,
    pub transfer: TransferOutcome,
}

/// Result of the elevation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DemSummary {
    /// Overlay the bounding box was read from; `None` when skipped.
    pub overlay: Option<PathBuf>,
    /// Buffered bounding box; `None` when skipped.
    pub bbox: Option<BoundingBox>,
    pub outcome: DemOutcome,
}

/// Search the catalog and download every matching product.
///
/// Transfer failures are reported in [`DownloadSummary::transfer`]; only
/// failures before the transfer starts are returned as errors.
pub async fn run_download<C>(
    config: &ProjectConfig,
    client: Arc<C>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
) -> Result<DownloadSummary, PipelineError>
where
    C: CatalogClient + ?Sized + 'static,
{
    let request = config.acquisition_request();
    let query = plan_query(&request)?;
    info!(
        platform = query.platform_code,
        level = query.product_level_code,
        start = %query.start,
        end = %query.end,
        max_results = query.max_results,
        "Searching catalog"
    );

    let search_client = Arc::clone(&client);
    let products: Vec<CatalogProduct> =
        tokio::task::spawn_blocking(move || search_client.search(&query))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;
    info!(count = products.len(), "Catalog search returned products");

    let slc_dir = config.slc_dir();
    fs::create_dir_all(&slc_dir).map_err(|source| PipelineError::Io {
        path: slc_dir.clone(),
        source,
    })?;

    let overlay = overlay::export_footprints(&products, &slc_dir)?;

    let removed = remove_incomplete(&slc_dir, &products).map_err(|source| PipelineError::Io {
        path: slc_dir.clone(),
        source,
    })?;
    if removed > 0 {
        info!(removed, "Removed incomplete downloads");
    }

    let state = TransferState::new(&slc_dir, products);
    let total = state.total_expected_bytes();
    let count = state.products().len();

    let transfer = if count == 0 {
        info!("No products to download");
        TransferOutcome {
            status: TransferStatus::Completed,
            bytes_observed: 0,
            total_expected: total,
        }
    } else {
        let parallelism = usize::try_from(request.parallelism).unwrap_or(1);
        DownloadOrchestrator::new(parallelism, request.product_kind)
            .with_poll_interval(config.download.poll_interval)
            .run(client, state, cancel, progress)
            .await
    };

    Ok(DownloadSummary {
        products: count,
        overlay,
        removed,
        transfer,
    })
}

/// Acquire the elevation tile covering the latest footprint overlay.
///
/// A finished elevation directory short-circuits before the overlay is read.
pub fn run_dem<F>(config: &ProjectConfig, fetcher: &F) -> Result<DemSummary, PipelineError>
where
    F: ElevationFetcher + ?Sized,
{
    let dem_dir = config.dem_dir();
    let state = dem::inspect(&dem_dir).map_err(|source| PipelineError::Io {
        path: dem_dir.clone(),
        source,
    })?;
    if let GuardState::Complete(count) = state {
        info!(dir = %dem_dir.display(), artifacts = count, "Elevation tile already complete");
        return Ok(DemSummary {
            overlay: None,
            bbox: None,
            outcome: DemOutcome::AlreadyComplete,
        });
    }

    let overlay_path = overlay::find_overlay(&config.slc_dir())?;
    info!(overlay = %overlay_path.display(), "Using footprint overlay");

    let bbox = overlay::extract_bbox(&overlay_path, config.dem.buffer)?;
    info!(bbox = %bbox.to_snwe_string(), "Extracted bounding box");

    let outcome = dem::acquire_elevation(&bbox, &dem_dir, config.dem.data_source, fetcher)?;

    Ok(DemSummary {
        overlay: Some(overlay_path),
        bbox: Some(bbox),
        outcome,
    })
}
