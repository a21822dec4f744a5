//! sarstage - SAR acquisition staging
//!
//! This library stages Sentinel-1 style SAR acquisitions for interferometric
//! processing: it searches a product catalog, records the footprints of the
//! result set as a KML overlay, downloads the products with live progress and
//! later derives the elevation tile covering those footprints.
//!
//! # Modules
//!
//! - [`geometry`]: envelopes, buffered bounding boxes and tile names
//! - [`catalog`]: acquisition requests, query planning and the ASF client
//! - [`overlay`]: footprint KML export and bounding-box extraction
//! - [`transfer`]: integrity scan and progress-tracked bulk download
//! - [`dem`]: idempotent elevation tile acquisition
//! - [`config`]: INI project configuration
//! - [`pipeline`]: the download and elevation pipelines
//! - [`logging`]: subscriber setup

pub mod catalog;
pub mod config;
pub mod dem;
pub mod geometry;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod transfer;

mod fsutil;
