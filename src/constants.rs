//! Application constants for the dataset loader
//!
//! Constants are centralized here and organized by functional domain, so the
//! fixed parts of the lifecycle (endpoint, cache identifiers, progress
//! checkpoints) live in one place.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("geoloader/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout, covering the whole streamed response.
    /// A stalled stream errors out instead of hanging the lifecycle.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Remote dataset endpoint
pub mod dataset {
    /// Default URL of the compressed dataset archive
    pub const DEFAULT_URL: &str =
        "https://data.geoloader.dev/places/places-v2.bin.xz";
}

/// Durable cache identifiers
pub mod cache {
    /// Database directory name under the platform cache dir
    pub const DB_DIR_NAME: &str = "geoloader";

    /// Named record space holding the dataset blob
    pub const TREE_NAME: &str = "dataset";

    /// Fixed key of the single decompressed blob
    pub const BLOB_KEY: &str = "data";

    /// Fixed key of the metadata record stored beside the blob
    pub const META_KEY: &str = "meta";

    /// Schema version of the cached dataset. Bumping this invalidates every
    /// previously stored blob on read.
    pub const SCHEMA_VERSION: u32 = 2;
}

/// Progress model constants
pub mod progress {
    /// Progress value reported at stage entry
    pub const STAGE_START: u8 = 0;

    /// Synthetic checkpoint emitted once decompression has been handed to a
    /// worker thread (the call itself reports no granular progress)
    pub const DECOMPRESS_STARTED: u8 = 10;

    /// Synthetic checkpoint emitted when decompression returns
    pub const DECOMPRESS_DONE: u8 = 90;

    /// Progress value at lifecycle completion
    pub const COMPLETE: u8 = 100;
}

// Re-export commonly used constants for convenience
pub use cache::SCHEMA_VERSION;
pub use dataset::DEFAULT_URL as DATASET_URL;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
