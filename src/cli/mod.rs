//! Command-line interface components
//!
//! CLI-specific code: argument parsing, command handlers, and progress
//! display wiring.

pub mod args;
pub mod commands;

pub use args::{CacheAction, CacheArgs, Cli, Commands, FetchArgs, GlobalArgs, LookupArgs};
pub use commands::{handle_cache, handle_fetch, handle_lookup};
