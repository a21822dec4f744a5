//! sarstage CLI - stage SAR acquisitions and elevation tiles.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use console::style;

use commands::Commands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "sarstage", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _logging = sarstage::logging::init_logging(cli.verbose, cli.log_file.as_deref())?;
    commands::run(cli.command)
}
