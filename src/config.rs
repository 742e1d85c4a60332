//! Configuration management for the dataset loader
//!
//! Provides a runtime [`LoaderConfig`] with zero-config defaults plus a
//! TOML-backed [`AppConfig`] with multi-source loading: an explicit path
//! override, a project-local file, then the user's standard config directory.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{cache, dataset, http};
use crate::errors::{ConfigError, Result};

/// Runtime configuration injected into a [`Loader`](crate::app::Loader)
///
/// Tests construct this directly with a temporary cache path; production code
/// usually derives it from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Remote dataset endpoint (fixed single GET resource)
    pub dataset_url: String,
    /// Path of the cache database directory
    pub cache_path: PathBuf,
    /// Schema version tag written beside the cached blob
    pub schema_version: u32,
    /// Request timeout applied to the whole streamed response
    pub request_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dataset_url: dataset::DEFAULT_URL.to_string(),
            cache_path: default_cache_path().unwrap_or_else(|_| PathBuf::from("./cache")),
            schema_version: cache::SCHEMA_VERSION,
            request_timeout: http::DEFAULT_TIMEOUT,
        }
    }
}

/// Resolve the platform cache directory for the loader database
pub fn default_cache_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir().ok_or(ConfigError::NoStandardDir { kind: "cache" })?;
    Ok(dir.join(cache::DB_DIR_NAME))
}

/// TOML application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Dataset source settings
    pub dataset: DatasetConfigToml,
    /// Cache settings
    pub cache: CacheConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly dataset source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfigToml {
    /// Remote dataset URL
    pub url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for DatasetConfigToml {
    fn default() -> Self {
        Self {
            url: dataset::DEFAULT_URL.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// TOML-friendly cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfigToml {
    /// Cache database directory (empty = platform default)
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Convert the TOML configuration to a runtime [`LoaderConfig`]
    pub fn to_loader_config(&self) -> Result<LoaderConfig> {
        let cache_path = match &self.cache.path {
            Some(path) => path.clone(),
            None => default_cache_path()?,
        };
        Ok(LoaderConfig {
            dataset_url: self.dataset.url.clone(),
            cache_path,
            schema_version: cache::SCHEMA_VERSION,
            request_timeout: Duration::from_secs(self.dataset.request_timeout_secs),
        })
    }

    /// Load configuration with multi-source precedence:
    /// 1. Explicit config file override
    /// 2. Project-local `geoloader.toml`
    /// 3. User config directory
    /// 4. Built-in defaults
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Find a configuration file in the standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from("./geoloader.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("geoloader").join("config.toml"));
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)?;
        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.dataset.url, dataset::DEFAULT_URL);
        assert_eq!(config.logging.level, "info");
        assert!(config.cache.path.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        let result = AppConfig::load(Some(missing)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let contents = r#"
[dataset]
url = "https://example.com/places.bin.xz"
request_timeout_secs = 60

[cache]
path = "/tmp/geoloader-test"

[logging]
level = "debug"
"#;
        tokio::fs::write(&config_path, contents).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();
        assert_eq!(config.dataset.url, "https://example.com/places.bin.xz");
        assert_eq!(config.logging.level, "debug");

        let runtime = config.to_loader_config().unwrap();
        assert_eq!(runtime.request_timeout, Duration::from_secs(60));
        assert_eq!(runtime.cache_path, PathBuf::from("/tmp/geoloader-test"));
        assert_eq!(runtime.schema_version, cache::SCHEMA_VERSION);
    }
}
