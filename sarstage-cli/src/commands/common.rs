//! Helpers shared across CLI commands.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use console::style;
use sarstage::config::ProjectConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

const RULE_WIDTH: usize = 60;

/// Print a section banner.
pub fn banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", style(&rule).green().bold());
    println!("{}", style(title).green().bold());
    println!("{}", style(&rule).green().bold());
}

/// Print a `label: value` line.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", style(label).bold(), value);
}

/// Load a project file and log where it came from.
pub fn load_config(path: &Path) -> Result<ProjectConfig, CliError> {
    let config = ProjectConfig::load(path)?;
    info!(path = %path.display(), project = %config.name, "Loaded project configuration");
    Ok(config)
}

/// Cancel `token` on Ctrl+C.
pub fn cancel_on_interrupt(token: CancellationToken) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        println!();
        println!("Received interrupt, stopping...");
        token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))
}

/// Record Ctrl+C in a flag instead of terminating the process.
///
/// Used while a child process runs: the child receives the signal itself and
/// its exit status reports the interruption.
pub fn flag_on_interrupt() -> Result<Arc<AtomicBool>, CliError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;
    Ok(interrupted)
}
