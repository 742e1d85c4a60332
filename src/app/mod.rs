//! Core loader logic
//!
//! This module contains the loading lifecycle and its collaborators: the
//! status model and subscription bus, the streaming downloader, the durable
//! cache, and the opaque engine boundary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use geoloader::app::{GeocodingEngine, HttpSource, Loader};
//! use geoloader::config::LoaderConfig;
//!
//! # async fn example(engine: Arc<dyn GeocodingEngine>) -> geoloader::Result<()> {
//! let config = LoaderConfig::default();
//! let source = Arc::new(HttpSource::new(&config)?);
//! let loader = Loader::new(&config, source, engine)?;
//!
//! let _sub = loader.subscribe(|update| {
//!     println!("{} ({}%)", update.status, update.progress);
//! });
//!
//! loader.run().await?;
//! if let Some(place) = loader.lookup(40.7128, -74.0060)? {
//!     println!("{}, {}", place.city, place.country_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod download;
pub mod engine;
pub mod events;
pub mod loader;
pub mod source;
pub mod status;

// Re-export main public API
pub use cache::{CacheRecord, DatasetCache};
pub use download::download_dataset;
pub use engine::{GeocodingEngine, Place};
pub use events::{StatusBus, Subscription};
pub use loader::Loader;
pub use source::{DatasetSource, DatasetStream, HttpSource};
pub use status::{Status, StatusUpdate};
