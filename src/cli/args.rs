//! Command-line argument parsing
//!
//! Defines the CLI structure using clap derive macros: dataset prefetching
//! with live progress, and cache inspection and maintenance.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// geoloader - Prefetch and manage the offline geocoding dataset
#[derive(Parser, Debug)]
#[command(
    name = "geoloader",
    version,
    about = "Prefetch the offline reverse-geocoding dataset into the local cache",
    long_about = "Acquires the geospatial dataset for an offline reverse geocoder: checks the \
local cache, streams the remote archive with progress reporting when absent, and persists the \
result so later runs start instantly."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the loading lifecycle and populate the local cache
    Fetch(FetchArgs),

    /// Resolve coordinates to the nearest place (fetching first if needed)
    Lookup(LookupArgs),

    /// Inspect or clear the local dataset cache
    Cache(CacheArgs),
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Override the remote dataset URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Re-download even if a cached dataset exists
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the lookup command
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Latitude in decimal degrees
    #[arg(value_name = "LAT", allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(value_name = "LON", allow_negative_numbers = true)]
    pub lon: f64,
}

/// Arguments for the cache command
#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    /// Cache action to perform
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache management actions
#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// Show whether a dataset is cached and its metadata
    Status {
        /// Emit the metadata record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the cached dataset
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective log level directive derived from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.global.very_verbose {
            "debug"
        } else if self.global.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_fetch() {
        let cli = Cli::try_parse_from(["geoloader", "fetch", "--force"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => assert!(args.force),
            other => panic!("expected fetch command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_lookup_coordinates() {
        let cli = Cli::try_parse_from(["geoloader", "lookup", "40.7128", "-74.0060"]).unwrap();
        match cli.command {
            Commands::Lookup(args) => {
                assert_eq!(args.lat, 40.7128);
                assert_eq!(args.lon, -74.0060);
            }
            other => panic!("expected lookup command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_cache_status_json() {
        let cli = Cli::try_parse_from(["geoloader", "cache", "status", "--json"]).unwrap();
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Status { json },
            }) => assert!(json),
            other => panic!("expected cache status, got {other:?}"),
        }
    }

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::try_parse_from(["geoloader", "-v", "fetch"]).unwrap();
        assert_eq!(cli.log_level(), "info");

        let cli = Cli::try_parse_from(["geoloader", "--very-verbose", "fetch"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
    }
}
