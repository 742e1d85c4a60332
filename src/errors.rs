//! Error types for the dataset loader
//!
//! This module defines error types for every stage of the loading lifecycle.
//! Errors are designed to be actionable: each variant names the stage that
//! failed and carries enough context for user feedback and logging.

use thiserror::Error;

/// Download and HTTP transport errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed (connection error, timeout, interrupted stream)
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Download failed: HTTP {status}")]
    Status { status: u16 },
}

/// Durable cache errors
///
/// A cache lookup miss is *not* an error; these variants cover operation
/// failures only (open, read, write).
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache database could not be opened
    #[error("Failed to open cache database: {0}")]
    Open(#[source] sled::Error),

    /// Cache read transaction failed
    #[error("Failed to read from cache: {0}")]
    Read(#[source] sled::Error),

    /// Cache write transaction failed
    #[error("Failed to write to cache: {0}")]
    Write(#[source] sled::Error),

    /// Cache metadata record could not be encoded or decoded
    #[error("Cache metadata encoding failed: {0}")]
    Metadata(#[from] bincode::Error),
}

/// Geocoding engine collaborator errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine runtime initialization failed
    #[error("Engine runtime initialization failed: {reason}")]
    RuntimeInit { reason: String },

    /// Input was not a valid compressed payload
    #[error("Decompression failed: {reason}")]
    DecompressionFailed { reason: String },

    /// Decompressed bytes were not a valid dataset for this schema version
    #[error("Index initialization failed: {reason}")]
    IndexInitFailed { reason: String },
}

/// Loader lifecycle errors
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Lookup attempted before the engine accepted a dataset
    #[error("Geocoder not ready: run the lifecycle to completion first")]
    NotReady,

    /// A background engine task was cancelled or panicked
    #[error("Engine task failed to complete")]
    TaskFailed,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at an explicitly given path
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),

    /// Could not resolve a standard directory (config or cache)
    #[error("Could not determine {kind} directory for this platform")]
    NoStandardDir { kind: &'static str },
}

/// Top-level application error that can represent any stage failure
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Loader error
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get error category for logging and status messages
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Cache(_) => "cache",
            AppError::Engine(_) => "engine",
            AppError::Loader(_) => "loader",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }

    /// Short human-readable stage description, used for the error status
    /// broadcast to subscribers
    pub fn stage_message(&self) -> String {
        match self {
            AppError::Download(_) => "Download failed".to_string(),
            AppError::Cache(e) => format!("Cache error: {e}"),
            AppError::Engine(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Engine result type alias
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AppError::Download(DownloadError::Status { status: 500 });
        assert_eq!(err.category(), "download");

        let err = AppError::Loader(LoaderError::NotReady);
        assert_eq!(err.category(), "loader");
    }

    #[test]
    fn test_download_failure_stage_message() {
        // Listeners receive a short fixed description for transport failures
        let err = AppError::Download(DownloadError::Status { status: 500 });
        assert_eq!(err.stage_message(), "Download failed");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::DecompressionFailed {
            reason: "not an xz stream".to_string(),
        };
        assert!(err.to_string().contains("Decompression failed"));
    }
}
