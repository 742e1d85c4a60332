//! Lifecycle orchestrator
//!
//! Drives the loader through its stages exactly once per invocation:
//! runtime init, cache probe, then either the cached fast path or the
//! download → decompress → persist → index path. Every stage transition is
//! broadcast before the stage's work begins; any failure is caught once at
//! the top, recorded as an error status, broadcast, and returned unchanged.
//!
//! Ordering is load-bearing: the decompressed blob is persisted *before* the
//! engine hand-off, so a crash during index construction still leaves a
//! usable cache for the next run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task;
use tracing::{info, instrument, warn};

use super::cache::DatasetCache;
use super::download::download_dataset;
use super::engine::{GeocodingEngine, Place};
use super::events::{StatusBus, Subscription};
use super::source::DatasetSource;
use super::status::{Status, StatusUpdate};
use crate::config::LoaderConfig;
use crate::constants::progress;
use crate::errors::{LoaderError, Result};

/// Progressive dataset loader
///
/// An explicit context object: construction injects the configuration, the
/// dataset source, and the engine collaborator, so tests instantiate
/// independent loaders instead of sharing process-wide state. One instance
/// owns its cache database and status bus for its whole lifetime.
pub struct Loader {
    source: Arc<dyn DatasetSource>,
    engine: Arc<dyn GeocodingEngine>,
    cache: DatasetCache,
    bus: StatusBus,
    ready: AtomicBool,
    // Serializes lifecycle invocations: a second caller awaits the in-flight
    // run and short-circuits once the loader is ready.
    run_guard: Mutex<()>,
}

impl Loader {
    /// Create a loader with injected collaborators
    ///
    /// Opens (creating if absent) the cache database at the configured path.
    pub fn new(
        config: &LoaderConfig,
        source: Arc<dyn DatasetSource>,
        engine: Arc<dyn GeocodingEngine>,
    ) -> Result<Self> {
        let cache = DatasetCache::open(&config.cache_path, config.schema_version)?;
        Ok(Self {
            source,
            engine,
            cache,
            bus: StatusBus::new(),
            ready: AtomicBool::new(false),
            run_guard: Mutex::new(()),
        })
    }

    /// Register a status callback; it immediately receives the current
    /// `(status, progress)` pair, then every subsequent change
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StatusUpdate) + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    /// The most recently published status observation
    pub fn status(&self) -> StatusUpdate {
        self.bus.current()
    }

    /// True once the engine has accepted a dataset; never reverts to false
    /// within the instance's lifetime
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run the loading lifecycle to completion
    ///
    /// Overlapping invocations coalesce: a second caller awaits the
    /// in-flight run and returns immediately if the loader is already ready.
    /// On failure the error status is broadcast to subscribers first, then
    /// the underlying error is returned; the caller decides whether to
    /// re-invoke (which re-checks the cache from scratch).
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<()> {
        let _guard = self.run_guard.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        match self.run_stages().await {
            Ok(()) => {
                self.ready.store(true, Ordering::Release);
                self.publish(Status::Ready, progress::COMPLETE);
                info!("geocoder ready");
                Ok(())
            }
            Err(e) => {
                warn!(category = e.category(), error = %e, "lifecycle failed");
                let progress = self.bus.current().progress;
                self.bus.publish(StatusUpdate {
                    status: Status::Error(e.stage_message()),
                    progress,
                });
                Err(e)
            }
        }
    }

    /// Find the nearest place to the given coordinates
    ///
    /// # Errors
    ///
    /// Fails with [`LoaderError::NotReady`] before the first successful
    /// [`run`](Self::run).
    pub fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<Place>> {
        if !self.is_ready() {
            return Err(LoaderError::NotReady.into());
        }
        Ok(self.engine.lookup(latitude, longitude))
    }

    async fn run_stages(&self) -> Result<()> {
        self.publish(Status::LoadingRuntime, progress::STAGE_START);
        self.engine.initialize_runtime().await?;

        if let Some(blob) = self.cache.retrieve().await? {
            info!(bytes = blob.len(), "using cached dataset");
            self.publish(Status::LoadingCached, progress::STAGE_START);
            self.initialize_index(blob).await?;
            return Ok(());
        }

        self.publish(Status::Downloading, progress::STAGE_START);
        let raw = {
            let bus = self.bus.clone();
            download_dataset(self.source.as_ref(), move |percent| {
                bus.publish(StatusUpdate {
                    status: Status::Downloading,
                    progress: percent,
                });
            })
            .await?
        };

        self.publish(Status::Decompressing, progress::STAGE_START);
        let dataset = self.decompress(raw).await?;

        // Persist before the engine hand-off: a crash past this point still
        // leaves a usable cache for the next run.
        self.cache.store(&dataset).await?;
        self.initialize_index(dataset).await?;
        Ok(())
    }

    /// Decompress on a blocking worker thread, with synthetic checkpoints
    /// around the call since it reports no granular progress itself
    async fn decompress(&self, raw: Vec<u8>) -> Result<Vec<u8>> {
        self.publish(Status::Decompressing, progress::DECOMPRESS_STARTED);
        let engine = self.engine.clone();
        let dataset = task::spawn_blocking(move || engine.decompress(&raw))
            .await
            .map_err(|_| LoaderError::TaskFailed)??;
        self.publish(Status::Decompressing, progress::DECOMPRESS_DONE);
        Ok(dataset)
    }

    /// Build the engine's in-memory index on a blocking worker thread
    async fn initialize_index(&self, dataset: Vec<u8>) -> Result<()> {
        let engine = self.engine.clone();
        task::spawn_blocking(move || engine.initialize_index(&dataset))
            .await
            .map_err(|_| LoaderError::TaskFailed)??;
        Ok(())
    }

    fn publish(&self, status: Status, progress: u8) {
        self.bus.publish(StatusUpdate { status, progress });
    }
}
