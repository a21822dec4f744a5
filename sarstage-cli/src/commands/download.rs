//! `sarstage download` - search, write the overlay, download.

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use sarstage::catalog::asf::AsfCatalog;
use sarstage::config::TOKEN_ENV;
use sarstage::pipeline;
use sarstage::transfer::{ProgressCallback, TransferStatus};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{banner, cancel_on_interrupt, field, load_config};
use crate::error::CliError;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Run the download command.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    banner(&format!("Downloading acquisitions for '{}'", config.name));
    field("Platform", config.download.platform);
    field(
        "Dates",
        format!(
            "{} - {}",
            config.download.start_date, config.download.end_date
        ),
    );
    field("Destination", config.slc_dir().display());
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create runtime: {}", e)))?;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone())?;

    if config.earthdata_token.is_none() {
        warn!("No Earthdata token configured, downloads will be rejected");
    }
    let client = Arc::new(AsfCatalog::new(config.earthdata_token.clone()));

    let bar = progress_bar();
    let callback: ProgressCallback = {
        let bar = bar.clone();
        Box::new(move |observed, total| {
            bar.set_length(total);
            bar.set_position(observed.min(total));
        })
    };

    let result = runtime.block_on(pipeline::run_download(
        &config,
        client,
        cancel,
        Some(callback),
    ));
    bar.finish_and_clear();
    let summary = result?;

    info!(
        products = summary.products,
        overlay = %summary.overlay.display(),
        status = %summary.transfer.status,
        "Download run finished"
    );

    field("Products", summary.products);
    field("Overlay", summary.overlay.display());
    if summary.removed > 0 {
        field("Removed partial files", summary.removed);
    }
    field(
        "Observed",
        format!(
            "{} of {}",
            HumanBytes(summary.transfer.bytes_observed),
            HumanBytes(summary.transfer.total_expected)
        ),
    );

    match summary.transfer.status {
        TransferStatus::Completed => {
            println!();
            println!("{}", style("Download complete.").green().bold());
            Ok(())
        }
        TransferStatus::AuthenticationFailed(reason) => {
            eprintln!();
            eprintln!("{} {}", style("Authentication failed:").red().bold(), reason);
            eprintln!(
                "Set the {} environment variable or add `token = ...` under [earthdata] in {}.",
                TOKEN_ENV,
                config_path.display()
            );
            process::exit(1);
        }
        TransferStatus::Interrupted => {
            runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
            Err(CliError::Interrupted)
        }
        TransferStatus::ConnectionLost(reason) => Err(CliError::TransferFailed(reason)),
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
