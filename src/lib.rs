//! Progressive dataset loader for offline reverse-geocoding engines
//!
//! `geoloader` bridges "a device with no local data" and "a ready, queryable
//! in-memory geocoder". It acquires a large, infrequently-changing geospatial
//! dataset, persists it in a durable local cache, and hands it to an opaque
//! geocoding engine, broadcasting fine-grained `(status, progress)` updates
//! to subscribers through every stage of the asynchronous lifecycle:
//!
//! cache-check → download → decompress → persist → engine-init
//!
//! The loader behaves predictably under partial failure at every stage:
//! network interruption, missing or stale cache, decompression failure, or
//! engine initialization failure each surface once as an error status, and a
//! subsequent run re-checks the cache from scratch.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use app::{GeocodingEngine, Loader, Place, Status, StatusUpdate};
pub use config::LoaderConfig;
pub use errors::{AppError, Result};
