//! Bulk transfer of catalog products.
//!
//! This module provides:
//! - Removal of truncated files from earlier runs (`integrity`)
//! - Transfer state with monotonic byte accounting (`state`)
//! - Directory-polling progress measurement (`progress`)
//! - Orchestration of the catalog download call (`orchestrator`)
//!
//! # Architecture
//!
//! ```text
//! DownloadOrchestrator
//!         │
//!         ├── CatalogClient::download (spawn_blocking)
//!         │
//!         ├── DirectoryProbe (polled on an interval)
//!         │
//!         └── TransferState (max of all measurements)
//! ```

mod integrity;
mod orchestrator;
mod progress;
mod state;

pub use integrity::remove_incomplete;
pub use orchestrator::{
    DownloadOrchestrator, TransferOutcome, TransferStatus, DEFAULT_CANCEL_GRACE,
    DEFAULT_POLL_INTERVAL,
};
pub use progress::{DirectoryProbe, ProgressCallback};
pub use state::TransferState;
