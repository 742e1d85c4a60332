//! CLI command handlers
//!
//! Wires the loader to the terminal: the fetch and lookup commands run the
//! lifecycle with an indicatif progress bar fed from the status bus, and the
//! cache commands inspect or clear the durable store directly.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::app::cache::DatasetCache;
use crate::app::engine::{GeocodingEngine, Place};
use crate::app::source::HttpSource;
use crate::app::status::Status;
use crate::app::Loader;
use crate::config::LoaderConfig;
use crate::errors::{EngineError, EngineResult, Result};

use super::args::{CacheAction, CacheArgs, FetchArgs, LookupArgs};

/// Engine backed by a flat place table
///
/// Decompresses the downloaded xz archive, deserializes the dataset as a
/// bincode-encoded place list, and resolves lookups with a nearest-neighbor
/// scan over great-circle distance. Applications with their own spatial
/// index plug a different [`GeocodingEngine`] into [`Loader`] and find the
/// cache already populated.
#[derive(Default)]
struct PlaceTableEngine {
    places: RwLock<Option<Vec<Place>>>,
}

#[async_trait]
impl GeocodingEngine for PlaceTableEngine {
    async fn initialize_runtime(&self) -> EngineResult<()> {
        Ok(())
    }

    fn decompress(&self, raw: &[u8]) -> EngineResult<Vec<u8>> {
        let mut dataset = Vec::new();
        lzma_rs::xz_decompress(&mut &raw[..], &mut dataset).map_err(|e| {
            EngineError::DecompressionFailed {
                reason: e.to_string(),
            }
        })?;
        Ok(dataset)
    }

    fn initialize_index(&self, dataset: &[u8]) -> EngineResult<()> {
        let places: Vec<Place> =
            bincode::deserialize(dataset).map_err(|e| EngineError::IndexInitFailed {
                reason: e.to_string(),
            })?;
        info!(places = places.len(), "place table loaded");
        *self.places.write().expect("place table lock poisoned") = Some(places);
        Ok(())
    }

    fn lookup(&self, latitude: f64, longitude: f64) -> Option<Place> {
        let places = self.places.read().expect("place table lock poisoned");
        places
            .as_ref()?
            .iter()
            .min_by(|a, b| {
                let da = haversine_km(latitude, longitude, a.latitude, a.longitude);
                let db = haversine_km(latitude, longitude, b.latitude, b.longitude);
                da.total_cmp(&db)
            })
            .cloned()
    }
}

/// Great-circle distance in kilometers between two coordinate pairs
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    6371.0 * c
}

/// Handle the fetch command: run the lifecycle with live progress
pub async fn handle_fetch(config: LoaderConfig, args: FetchArgs, quiet: bool) -> Result<()> {
    let config = match args.url {
        Some(url) => LoaderConfig {
            dataset_url: url,
            ..config
        },
        None => config,
    };

    if args.force {
        let cache = DatasetCache::open(&config.cache_path, config.schema_version)?;
        cache.clear().await?;
        info!("cleared existing cached dataset");
    }

    let loader = build_loader(&config)?;

    let _sub = if quiet {
        None
    } else {
        Some(attach_progress_bar(&loader))
    };

    loader.run().await?;
    if !quiet {
        println!("Dataset ready (cached at {})", config.cache_path.display());
    }
    Ok(())
}

/// Handle the lookup command: run the lifecycle if needed, then resolve the
/// coordinates and print the place as JSON
pub async fn handle_lookup(config: LoaderConfig, args: LookupArgs, quiet: bool) -> Result<()> {
    let loader = build_loader(&config)?;

    let _sub = if quiet {
        None
    } else {
        Some(attach_progress_bar(&loader))
    };

    loader.run().await?;
    match loader.lookup(args.lat, args.lon)? {
        Some(place) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&place).expect("place is serializable")
            );
        }
        None => println!("No place found"),
    }
    Ok(())
}

/// Handle the cache subcommands
pub async fn handle_cache(config: LoaderConfig, args: CacheArgs) -> Result<()> {
    let cache = DatasetCache::open(&config.cache_path, config.schema_version)?;

    match args.action {
        CacheAction::Status { json } => match cache.record()? {
            Some(record) if json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&record).expect("record is serializable")
                );
                Ok(())
            }
            Some(record) => {
                println!("Cached dataset:");
                println!("  schema version: {}", record.schema_version);
                println!("  size:           {} bytes", record.length);
                println!("  stored at:      {}", record.stored_at);
                Ok(())
            }
            None => {
                println!("No dataset cached");
                Ok(())
            }
        },
        CacheAction::Clear => {
            cache.clear().await?;
            println!("Cache cleared");
            Ok(())
        }
    }
}

fn build_loader(config: &LoaderConfig) -> Result<Loader> {
    let source = Arc::new(HttpSource::new(config)?);
    Loader::new(config, source, Arc::new(PlaceTableEngine::default()))
}

/// Subscribe an indicatif bar to the loader's status bus
fn attach_progress_bar(loader: &Loader) -> crate::app::Subscription {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg:>18} [{bar:40.cyan/blue}] {pos:>3}%")
            .expect("valid progress template")
            .progress_chars("=>-"),
    );

    loader.subscribe(move |update| {
        bar.set_message(update.status.to_string());
        bar.set_position(update.progress as u64);
        match &update.status {
            Status::Ready => bar.finish_with_message("ready"),
            Status::Error(msg) => bar.abandon_with_message(format!("error: {msg}")),
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(city: &str, latitude: f64, longitude: f64) -> Place {
        Place {
            city: city.to_string(),
            region: "Region".to_string(),
            region_code: "RG".to_string(),
            district: String::new(),
            country_code: "US".to_string(),
            country_name: "United States".to_string(),
            postal_code: String::new(),
            timezone: "America/New_York".to_string(),
            timezone_abbr: "EST".to_string(),
            utc_offset: -18000,
            utc_offset_str: "UTC-5".to_string(),
            latitude,
            longitude,
            currency: "USD".to_string(),
            continent_code: "NA".to_string(),
            continent_name: "North America".to_string(),
            is_eu: false,
            dst_active: false,
        }
    }

    #[test]
    fn test_lookup_before_index_returns_none() {
        let engine = PlaceTableEngine::default();
        assert!(engine.lookup(40.7128, -74.0060).is_none());
    }

    #[test]
    fn test_lookup_resolves_nearest_place() {
        let engine = PlaceTableEngine::default();
        let table = vec![
            place("New York", 40.7128, -74.0060),
            place("Los Angeles", 34.0522, -118.2437),
        ];
        let dataset = bincode::serialize(&table).unwrap();
        engine.initialize_index(&dataset).unwrap();

        // Newark is much closer to New York than to Los Angeles
        let resolved = engine.lookup(40.7357, -74.1724).unwrap();
        assert_eq!(resolved.city, "New York");

        let resolved = engine.lookup(33.9, -118.0).unwrap();
        assert_eq!(resolved.city, "Los Angeles");
    }

    #[test]
    fn test_invalid_dataset_fails_index_init() {
        let engine = PlaceTableEngine::default();
        let result = engine.initialize_index(b"definitely not a place table");
        assert!(matches!(
            result,
            Err(EngineError::IndexInitFailed { .. })
        ));
    }

    #[test]
    fn test_haversine_known_distance() {
        // New York to Los Angeles is roughly 3940 km
        let d = haversine_km(40.7128, -74.0060, 34.0522, -118.2437);
        assert!(d > 3900.0 && d < 4000.0);
    }
}
