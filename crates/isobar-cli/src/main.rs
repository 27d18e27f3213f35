mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::Cli;
use crate::error::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info};

fn main() -> ExitCode {
    match run_app() {
        Ok(code) => code,
        Err(e) => {
            error!("❌ Search failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_app() -> Result<ExitCode> {
    let cli = Cli::parse();
    let app = config::resolve(&cli)?;
    logging::setup_logging(cli.verbose, cli.quiet, Some(app.run_log.clone()))?;

    info!("🚀 isobar v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);
    debug!("Resolved configuration: {:?}", &app);

    let code = commands::search::run(&cli, &app)?;
    info!("✅ Search completed.");
    Ok(code)
}
