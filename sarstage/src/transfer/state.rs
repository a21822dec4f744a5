//! State of one bulk transfer.

use std::path::{Path, PathBuf};

use crate::catalog::CatalogProduct;

/// Transfer state for a product list headed into one directory.
///
/// The observed byte count only ever grows: [`observe`](Self::observe)
/// keeps the maximum of every measurement it is given.
#[derive(Debug, Clone)]
pub struct TransferState {
    destination: PathBuf,
    products: Vec<CatalogProduct>,
    total_expected_bytes: u64,
    bytes_observed: u64,
}

impl TransferState {
    /// Create a new transfer state.
    pub fn new(destination: impl Into<PathBuf>, products: Vec<CatalogProduct>) -> Self {
        let total_expected_bytes = products.iter().map(|p| p.expected_bytes).sum();
        Self {
            destination: destination.into(),
            products,
            total_expected_bytes,
            bytes_observed: 0,
        }
    }

    /// Destination directory.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Products being transferred.
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Sum of the expected sizes of all products.
    pub fn total_expected_bytes(&self) -> u64 {
        self.total_expected_bytes
    }

    /// Largest byte count observed so far.
    pub fn bytes_observed(&self) -> u64 {
        self.bytes_observed
    }

    /// Record a measurement and return the value to publish.
    pub fn observe(&mut self, measured: u64) -> u64 {
        self.bytes_observed = self.bytes_observed.max(measured);
        self.bytes_observed
    }

    /// Progress as a percentage of the expected total.
    pub fn progress_percent(&self) -> f64 {
        if self.total_expected_bytes == 0 {
            100.0
        } else {
            (self.bytes_observed as f64 / self.total_expected_bytes as f64) * 100.0
        }
    }
}
