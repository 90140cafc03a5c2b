//! ambucache - cached bank and country lookups for the ambulance network dashboard
//!
//! Results are kept in a two-tier TTL cache so repeated lookups do not hit the
//! backend until their entries expire.

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ambucache::cli::{self, Cli};

/// Sends logs to stderr, honoring `RUST_LOG` when set
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "ambucache=debug" } else { "ambucache=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = io::stdout().lock();
    if let Err(e) = cli::run(&cli, &mut stdout).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
