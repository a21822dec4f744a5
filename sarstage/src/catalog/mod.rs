//! Product catalog: acquisition requests, query planning and the client seam.
//!
//! The catalog service itself is a collaborator behind [`CatalogClient`].
//! This module owns the typed request model, the translation of a request into
//! a normalized [`CatalogQuery`] and the product records a search returns.
//!
//! # Architecture
//!
//! ```text
//! AcquisitionRequest ──plan_query──> CatalogQuery ──CatalogClient::search──> Vec<CatalogProduct>
//!                                                                                 │
//!                                              CatalogClient::download <──────────┘
//! ```

pub mod asf;
mod error;
mod query;
mod types;

pub use error::{CatalogError, CatalogResult, TransferError};
pub use query::{plan_query, CatalogQuery};
pub use types::{AcquisitionRequest, CatalogProduct, Platform, ProductKind};

use std::path::Path;

use tokio_util::sync::CancellationToken;

/// Search and bulk-download interface of a product catalog.
///
/// Implementations own their network protocol, authentication and the
/// fan-out of a bulk download across workers.
pub trait CatalogClient: Send + Sync {
    /// Run a search and return the matching products.
    fn search(&self, query: &CatalogQuery) -> CatalogResult<Vec<CatalogProduct>>;

    /// Download every product into `destination`.
    ///
    /// Blocks until all transfers finish or one of them fails. Files are
    /// written under their `file_name`. Implementations should stop early
    /// once `cancel` is cancelled and report [`TransferError::Cancelled`].
    fn download(
        &self,
        products: &[CatalogProduct],
        destination: &Path,
        parallelism: usize,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError>;
}
