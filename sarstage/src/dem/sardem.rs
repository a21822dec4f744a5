//! `sardem` command adapter.
//!
//! Runs the external `sardem` executable in the current working directory.

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::{debug, info};

use super::error::FetchError;
use super::{ElevationFetcher, ElevationRequest};

/// Exit code of a process terminated by SIGINT through a shell.
const SIGINT_EXIT_CODE: i32 = 130;

/// Fetches elevation tiles by running `sardem`.
#[derive(Debug, Clone)]
pub struct SardemCommand {
    program: PathBuf,
}

impl Default for SardemCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl SardemCommand {
    /// Use `sardem` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("sardem"),
        }
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for a request.
    pub fn args(request: &ElevationRequest) -> Vec<String> {
        let [west, south, east, north] = request.bbox;
        let mut args = vec![
            "--bbox".to_string(),
            west.to_string(),
            south.to_string(),
            east.to_string(),
            north.to_string(),
            "--data".to_string(),
            request.data_source.code().to_string(),
        ];
        if request.emit_metadata {
            args.push("--make-isce-xml".to_string());
        }
        args.push("--output".to_string());
        args.push(request.output_name.clone());
        args
    }

    /// Printable form of the command for a request.
    pub fn command_line(&self, request: &ElevationRequest) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(Self::args(request));
        parts.join(" ")
    }
}

impl ElevationFetcher for SardemCommand {
    fn fetch(&self, request: &ElevationRequest) -> Result<(), FetchError> {
        info!(command = %self.command_line(request), "Running sardem");

        let status = Command::new(&self.program)
            .args(Self::args(request))
            .status()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FetchError::Failed(format!(
                    "{} not found; install sardem or add it to PATH",
                    self.program.display()
                )),
                _ => FetchError::Failed(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                )),
            })?;

        debug!(%status, "sardem exited");
        check_status(status)
    }
}

fn check_status(status: ExitStatus) -> Result<(), FetchError> {
    if status.success() {
        return Ok(());
    }
    if was_interrupted(&status) {
        return Err(FetchError::Interrupted);
    }
    Err(FetchError::Failed(format!("sardem {}", status)))
}

#[cfg(unix)]
fn was_interrupted(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    const SIGINT: i32 = 2;
    status.signal() == Some(SIGINT) || status.code() == Some(SIGINT_EXIT_CODE)
}

#[cfg(not(unix))]
fn was_interrupted(status: &ExitStatus) -> bool {
    status.code() == Some(SIGINT_EXIT_CODE)
}
