//! geoloader CLI application
//!
//! Prefetches the offline reverse-geocoding dataset into the local cache and
//! manages the cached copy, with live progress output.

use std::process;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use geoloader::cli::{handle_cache, handle_fetch, handle_lookup, Cli, Commands};
use geoloader::config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    info!("geoloader v{} starting", env!("CARGO_PKG_VERSION"));

    let app_config = AppConfig::load(cli.global.config.clone()).await?;
    let loader_config = app_config.to_loader_config()?;

    match cli.command {
        Commands::Fetch(args) => handle_fetch(loader_config, args, cli.global.quiet).await?,
        Commands::Lookup(args) => handle_lookup(loader_config, args, cli.global.quiet).await?,
        Commands::Cache(args) => handle_cache(loader_config, args).await?,
    }
    Ok(())
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("geoloader={}", cli.log_level()).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
