//! Bulk transfer orchestration.
//!
//! The catalog's download call runs as a single blocking task. While it
//! runs, a foreground loop polls the destination directory and publishes
//! byte-level progress. Cancellation stops polling and gives the worker a
//! bounded grace period before the transfer is reported as interrupted.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::{DirectoryProbe, ProgressCallback};
use super::state::TransferState;
use crate::catalog::{CatalogClient, ProductKind, TransferError};

/// Default interval between directory polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default time a cancelled worker is given to stop.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Terminal status of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// Every product was transferred.
    Completed,
    /// The catalog rejected the credentials.
    AuthenticationFailed(String),
    /// The transfer was cancelled.
    Interrupted,
    /// The transfer failed for any other reason.
    ConnectionLost(String),
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Completed => write!(f, "completed"),
            TransferStatus::AuthenticationFailed(msg) => {
                write!(f, "authentication failed: {}", msg)
            }
            TransferStatus::Interrupted => write!(f, "interrupted"),
            TransferStatus::ConnectionLost(msg) => write!(f, "connection lost: {}", msg),
        }
    }
}

/// Result of one transfer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub status: TransferStatus,
    pub bytes_observed: u64,
    pub total_expected: u64,
}

impl TransferOutcome {
    /// Whether the transfer completed.
    pub fn is_completed(&self) -> bool {
        self.status == TransferStatus::Completed
    }
}

/// Drives a bulk transfer and reports its progress.
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    parallelism: usize,
    product_kind: ProductKind,
    poll_interval: Duration,
    cancel_grace: Duration,
}

impl DownloadOrchestrator {
    /// Create an orchestrator for `product_kind` with the given worker count.
    pub fn new(parallelism: usize, product_kind: ProductKind) -> Self {
        Self {
            parallelism: parallelism.max(1),
            product_kind,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }

    /// Set the directory poll interval, at least one millisecond.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Set how long a cancelled worker is waited for.
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    /// Number of parallel workers handed to the catalog.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Run the transfer to completion, failure or cancellation.
    ///
    /// `progress` receives `(bytes_observed, total_expected)` on every poll;
    /// the reported byte count never decreases.
    pub async fn run<C>(
        &self,
        client: Arc<C>,
        mut state: TransferState,
        cancel: CancellationToken,
        progress: Option<ProgressCallback>,
    ) -> TransferOutcome
    where
        C: CatalogClient + ?Sized + 'static,
    {
        let probe = DirectoryProbe::new(state.destination(), self.product_kind.file_pattern());

        info!(
            products = state.products().len(),
            total_bytes = state.total_expected_bytes(),
            parallelism = self.parallelism,
            dir = %state.destination().display(),
            "Starting bulk transfer"
        );

        let products = state.products().to_vec();
        let destination = state.destination().to_path_buf();
        let parallelism = self.parallelism;
        let worker_cancel = cancel.clone();
        let mut handle = tokio::task::spawn_blocking(move || {
            client.download(&products, &destination, parallelism, &worker_cancel)
        });

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let status = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Transfer cancelled, waiting for workers to stop");
                    if tokio::time::timeout(self.cancel_grace, &mut handle).await.is_err() {
                        warn!(
                            grace_ms = self.cancel_grace.as_millis() as u64,
                            "Workers did not stop within the grace period"
                        );
                    }
                    break TransferStatus::Interrupted;
                }

                joined = &mut handle => {
                    break resolve(joined);
                }

                _ = ticker.tick() => {
                    publish(&probe, &mut state, progress.as_ref());
                }
            }
        };

        if status == TransferStatus::Completed {
            publish(&probe, &mut state, progress.as_ref());
        }

        match &status {
            TransferStatus::Completed => info!(
                bytes = state.bytes_observed(),
                "Bulk transfer complete"
            ),
            other => warn!(
                status = %other,
                bytes = state.bytes_observed(),
                "Bulk transfer ended"
            ),
        }

        TransferOutcome {
            status,
            bytes_observed: state.bytes_observed(),
            total_expected: state.total_expected_bytes(),
        }
    }
}

fn resolve(joined: Result<Result<(), TransferError>, JoinError>) -> TransferStatus {
    match joined {
        Ok(Ok(())) => TransferStatus::Completed,
        Ok(Err(TransferError::Authentication(msg))) => TransferStatus::AuthenticationFailed(msg),
        Ok(Err(TransferError::Cancelled)) => TransferStatus::Interrupted,
        Ok(Err(TransferError::Connection(msg))) => TransferStatus::ConnectionLost(msg),
        Err(e) => TransferStatus::ConnectionLost(format!("transfer worker failed: {}", e)),
    }
}

fn publish(
    probe: &DirectoryProbe,
    state: &mut TransferState,
    progress: Option<&ProgressCallback>,
) {
    match probe.measure() {
        Ok(measured) => {
            let observed = state.observe(measured);
            debug!(observed, total = state.total_expected_bytes(), "Transfer progress");
            if let Some(callback) = progress {
                callback(observed, state.total_expected_bytes());
            }
        }
        Err(e) => warn!(
            dir = %probe.dir().display(),
            error = %e,
            "Failed to measure progress"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::thread;

    use geo_types::{Geometry, Point};

    use crate::catalog::{CatalogError, CatalogProduct, CatalogQuery, CatalogResult};

    fn product(file_name: &str, expected_bytes: u64) -> CatalogProduct {
        CatalogProduct {
            id: file_name.to_string(),
            footprint: Geometry::Point(Point::new(0.0, 0.0)),
            expected_bytes,
            file_name: file_name.to_string(),
            url: String::new(),
        }
    }

    /// Behaviour of the fake catalog's download call.
    enum Behaviour {
        /// Write each file in steps, pausing between them.
        Write { step: usize, pause: Duration },
        Fail(TransferError),
        Panic,
        /// Block until cancelled, then report cancellation.
        WaitForCancel,
        /// Ignore cancellation and sleep.
        Ignore(Duration),
    }

    struct FakeCatalog {
        behaviour: Behaviour,
    }

    impl CatalogClient for FakeCatalog {
        fn search(&self, _query: &CatalogQuery) -> CatalogResult<Vec<CatalogProduct>> {
            Err(CatalogError::Search("not used".to_string()))
        }

        fn download(
            &self,
            products: &[CatalogProduct],
            destination: &Path,
            _parallelism: usize,
            cancel: &CancellationToken,
        ) -> Result<(), TransferError> {
            match &self.behaviour {
                Behaviour::Write { step, pause } => {
                    for product in products {
                        let path = destination.join(&product.file_name);
                        let mut written = 0usize;
                        while (written as u64) < product.expected_bytes {
                            written = (written + step).min(product.expected_bytes as usize);
                            fs::write(&path, vec![0u8; written]).unwrap();
                            thread::sleep(*pause);
                        }
                    }
                    Ok(())
                }
                Behaviour::Fail(err) => Err(err.clone()),
                Behaviour::Panic => panic!("worker exploded"),
                Behaviour::WaitForCancel => {
                    while !cancel.is_cancelled() {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(TransferError::Cancelled)
                }
                Behaviour::Ignore(duration) => {
                    thread::sleep(*duration);
                    Ok(())
                }
            }
        }
    }

    fn orchestrator() -> DownloadOrchestrator {
        DownloadOrchestrator::new(2, ProductKind::Standard)
            .with_poll_interval(Duration::from_millis(5))
            .with_cancel_grace(Duration::from_millis(500))
    }

    async fn run_with(
        behaviour: Behaviour,
        dir: &Path,
        products: Vec<CatalogProduct>,
        cancel: CancellationToken,
    ) -> TransferOutcome {
        let client = Arc::new(FakeCatalog { behaviour });
        let state = TransferState::new(dir, products);
        orchestrator().run(client, state, cancel, None).await
    }

    #[tokio::test]
    async fn test_completed_transfer_reports_monotonic_progress() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(FakeCatalog {
            behaviour: Behaviour::Write {
                step: 100,
                pause: Duration::from_millis(3),
            },
        });
        let state = TransferState::new(
            dir.path(),
            vec![product("a.zip", 1000), product("b.zip", 500)],
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |observed, total| {
            sink.lock().unwrap().push((observed, total));
        });

        let outcome = orchestrator()
            .run(client, state, CancellationToken::new(), Some(callback))
            .await;

        assert_eq!(outcome.status, TransferStatus::Completed);
        assert!(outcome.is_completed());
        assert_eq!(outcome.total_expected, 1500);
        assert_eq!(outcome.bytes_observed, 1500);

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&(_, total)| total == 1500));
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.last().map(|&(observed, _)| observed), Some(1500));
    }

    #[tokio::test]
    async fn test_authentication_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_with(
            Behaviour::Fail(TransferError::Authentication("401".to_string())),
            dir.path(),
            vec![product("a.zip", 10)],
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            outcome.status,
            TransferStatus::AuthenticationFailed("401".to_string())
        );
    }

    #[tokio::test]
    async fn test_connection_error_is_connection_lost() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_with(
            Behaviour::Fail(TransferError::Connection("reset".to_string())),
            dir.path(),
            vec![product("a.zip", 10)],
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            outcome.status,
            TransferStatus::ConnectionLost("reset".to_string())
        );
    }

    #[tokio::test]
    async fn test_worker_panic_is_connection_lost() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_with(
            Behaviour::Panic,
            dir.path(),
            vec![product("a.zip", 10)],
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(outcome.status, TransferStatus::ConnectionLost(_)));
    }

    #[tokio::test]
    async fn test_collaborator_cancel_is_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_with(
            Behaviour::Fail(TransferError::Cancelled),
            dir.path(),
            vec![product("a.zip", 10)],
            CancellationToken::new(),
        )
        .await;

        assert_eq!(outcome.status, TransferStatus::Interrupted);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_cooperative_worker() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let outcome = run_with(
            Behaviour::WaitForCancel,
            dir.path(),
            vec![product("a.zip", 10)],
            cancel,
        )
        .await;

        assert_eq!(outcome.status, TransferStatus::Interrupted);
        assert_eq!(outcome.total_expected, 10);
    }

    #[tokio::test]
    async fn test_cancellation_does_not_wait_past_grace() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = Arc::new(FakeCatalog {
            behaviour: Behaviour::Ignore(Duration::from_millis(400)),
        });
        let state = TransferState::new(dir.path(), vec![product("a.zip", 10)]);
        let started = std::time::Instant::now();
        let outcome = orchestrator()
            .with_cancel_grace(Duration::from_millis(20))
            .run(client, state, cancel, None)
            .await;

        assert_eq!(outcome.status, TransferStatus::Interrupted);
        assert!(started.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_zero_poll_interval_still_polls() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(FakeCatalog {
            behaviour: Behaviour::Write {
                step: 50,
                pause: Duration::from_millis(2),
            },
        });
        let state = TransferState::new(dir.path(), vec![product("a.zip", 100)]);

        let outcome = DownloadOrchestrator::new(1, ProductKind::Standard)
            .with_poll_interval(Duration::ZERO)
            .run(client, state, CancellationToken::new(), None)
            .await;

        assert_eq!(outcome.status, TransferStatus::Completed);
        assert_eq!(outcome.bytes_observed, 100);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TransferStatus::Completed.to_string(), "completed");
        assert_eq!(
            TransferStatus::ConnectionLost("reset".to_string()).to_string(),
            "connection lost: reset"
        );
    }

    #[test]
    fn test_parallelism_is_at_least_one() {
        assert_eq!(
            DownloadOrchestrator::new(0, ProductKind::Subswath).parallelism(),
            1
        );
    }
}
