//! End-to-end tests: footprints go out as an overlay and come back as an
//! elevation tile request.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use geo_types::{polygon, Geometry};

use sarstage::catalog::CatalogProduct;
use sarstage::config::ProjectConfig;
use sarstage::dem::{DemOutcome, ElevationFetcher, ElevationRequest, FetchError};
use sarstage::geometry::{BoundingBox, BufferDegrees};
use sarstage::overlay::{export_footprints_dated, extract_bbox, find_overlay};
use sarstage::pipeline::run_dem;

static CWD_LOCK: Mutex<()> = Mutex::new(());

fn lock_cwd() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn scene() -> CatalogProduct {
    CatalogProduct {
        id: "S1A_IW_SLC__1SDV_20240105".to_string(),
        footprint: Geometry::Polygon(polygon![
            (x: -78.0, y: -1.0),
            (x: -76.0, y: -1.0),
            (x: -76.0, y: 1.0),
            (x: -78.0, y: 1.0),
            (x: -78.0, y: -1.0),
        ]),
        expected_bytes: 4_000_000_000,
        file_name: "S1A_IW_SLC__1SDV_20240105.zip".to_string(),
        url: "https://example.test/S1A_IW_SLC__1SDV_20240105.zip".to_string(),
    }
}

/// Writes the three files a real elevation tool leaves behind.
struct WritingFetcher;

impl ElevationFetcher for WritingFetcher {
    fn fetch(&self, request: &ElevationRequest) -> Result<(), FetchError> {
        for suffix in ["", ".xml", ".vrt"] {
            fs::write(format!("{}{}", request.output_name, suffix), b"dem")
                .map_err(|e| FetchError::Failed(e.to_string()))?;
        }
        Ok(())
    }
}

struct FailingFetcher;

impl ElevationFetcher for FailingFetcher {
    fn fetch(&self, _request: &ElevationRequest) -> Result<(), FetchError> {
        Err(FetchError::Failed("tile server unavailable".to_string()))
    }
}

fn project(work: &Path) -> ProjectConfig {
    let content = format!(
        "[project]
name = quito
work_dir = {}

[download]
platform = SENTINEL-1
start_date = 20240101
end_date = 20240131
aoi = POLYGON((-78 -1, -76 -1, -76 1, -78 1, -78 -1))

[dem]
buffer_lat = 0.5
buffer_lon = 0.5
",
        work.display()
    );
    ProjectConfig::from_ini_str(&content).unwrap()
}

#[test]
fn footprint_round_trips_to_tile_name() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

    let overlay = export_footprints_dated(&[scene()], dir.path(), date).unwrap();
    let content = fs::read_to_string(&overlay).unwrap();
    assert_eq!(content.matches("<Placemark>").count(), 1);
    assert_eq!(find_overlay(dir.path()).unwrap(), overlay);

    let raw = extract_bbox(&overlay, BufferDegrees::none()).unwrap();
    assert_eq!(raw, BoundingBox::new(-1.0, 1.0, -78.0, -76.0));

    let buffered = extract_bbox(&overlay, BufferDegrees::default()).unwrap();
    assert_eq!(buffered, BoundingBox::new(-1.5, 1.5, -78.5, -75.5));

    let aligned = buffered.align_outward();
    assert_eq!(aligned.as_wsen(), [-79, -2, -75, 2]);
    assert_eq!(aligned.tile_name().as_str(), "S02_N02_W079_W075");
}

#[test]
fn dem_pipeline_creates_tile_once() {
    let _cwd = lock_cwd();
    let work = tempfile::tempdir().unwrap();
    let config = project(work.path());
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    export_footprints_dated(&[scene()], &config.slc_dir(), date).unwrap();

    let first = run_dem(&config, &WritingFetcher).unwrap();
    match &first.outcome {
        DemOutcome::Created { tile, files } => {
            assert_eq!(tile.as_str(), "S02_N02_W079_W075");
            assert_eq!(files.len(), 3);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        first.bbox.map(|b| b.to_snwe_string()),
        Some("SNWE: -1.5 1.5 -78.5 -75.5".to_string())
    );

    // A failing fetcher proves the second run never reaches the tool.
    let second = run_dem(&config, &FailingFetcher).unwrap();
    assert_eq!(second.outcome, DemOutcome::AlreadyComplete);
}

#[test]
fn failed_fetch_restores_working_directory() {
    let _cwd = lock_cwd();
    let before = env::current_dir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let config = project(work.path());
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    export_footprints_dated(&[scene()], &config.slc_dir(), date).unwrap();

    let result = run_dem(&config, &FailingFetcher);

    assert!(result.is_err());
    assert_eq!(env::current_dir().unwrap(), before);
}
