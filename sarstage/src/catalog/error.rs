//! Error types for the catalog module.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while planning or running a catalog search.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The acquisition request failed validation; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The search call failed or returned an incomplete result set.
    #[error("catalog search failed: {0}")]
    Search(String),

    /// A product record in the search response could not be understood.
    #[error("malformed product record: {0}")]
    MalformedProduct(String),
}

/// Failures surfaced by a bulk download.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    /// Credentials were missing or rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or I/O failure during the transfer.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transfer was cancelled by the operator.
    #[error("transfer cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let err = CatalogError::InvalidRequest("max_results must be positive".to_string());
        assert_eq!(err.to_string(), "invalid request: max_results must be positive");
    }

    #[test]
    fn test_transfer_error_display() {
        let err = TransferError::Authentication("HTTP 401".to_string());
        assert!(err.to_string().contains("authentication failed"));
        assert_eq!(TransferError::Cancelled.to_string(), "transfer cancelled");
    }
}
