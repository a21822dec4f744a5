//! Authenticated HTTP download of single products.
//!
//! Streams each payload straight into the destination directory so that a
//! directory poller sees the file grow. Files already at or above their
//! expected size are skipped.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::catalog::error::TransferError;
use crate::catalog::types::CatalogProduct;

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Bearer-token HTTP downloader.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    token: String,
}

impl HttpDownloader {
    /// Create a downloader with the given read timeout and bearer token.
    pub fn new(timeout: Duration, token: &str) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TransferError::Connection(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    /// Download one product into `destination`, returning the bytes on disk.
    pub fn download(
        &self,
        product: &CatalogProduct,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, TransferError> {
        let dest = destination.join(&product.file_name);

        if let Some(size) = complete_size(&dest, product.expected_bytes) {
            debug!(file = %product.file_name, size, "File already exists, skipping download");
            return Ok(size);
        }

        let mut response = self
            .client
            .get(&product.url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| TransferError::Connection(format!("{}: {}", product.file_name, e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransferError::Authentication(format!(
                "{} rejected credentials ({})",
                product.url, status
            )));
        }
        if !status.is_success() {
            return Err(TransferError::Connection(format!(
                "GET {} failed with status {}",
                product.url, status
            )));
        }

        let content_length = response.content_length();

        let file = File::create(&dest).map_err(|e| {
            TransferError::Connection(format!("failed to create {}: {}", dest.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        loop {
            if cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let bytes_read = response.read(&mut buffer).map_err(|e| {
                TransferError::Connection(format!("read error on {}: {}", product.file_name, e))
            })?;
            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read]).map_err(|e| {
                TransferError::Connection(format!("write error on {}: {}", dest.display(), e))
            })?;
            downloaded += bytes_read as u64;
        }

        writer.flush().map_err(|e| {
            TransferError::Connection(format!("write error on {}: {}", dest.display(), e))
        })?;

        let expected = content_length.unwrap_or(0).max(product.expected_bytes);
        if downloaded < expected {
            return Err(TransferError::Connection(format!(
                "{}: received {} of {} bytes",
                product.file_name, downloaded, expected
            )));
        }

        info!(file = %product.file_name, bytes = downloaded, "Downloaded product");
        Ok(downloaded)
    }
}

/// Size of `path` when it already holds at least `expected` bytes.
fn complete_size(path: &Path, expected: u64) -> Option<u64> {
    let size = fs::metadata(path).ok()?.len();
    (expected > 0 && size >= expected).then_some(size)
}
