//! Geocoding engine collaborator boundary
//!
//! The engine is opaque to the loader: it exposes runtime initialization,
//! payload decompression, index construction, and coordinate lookup, and
//! nothing else. The loader never inspects dataset bytes itself.
//!
//! `decompress` and `initialize_index` are CPU-bound and synchronous; the
//! loader dispatches them to a blocking worker thread so they cannot stall
//! progress delivery on the cooperative executor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;

/// A resolved place record returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// City or locality name
    pub city: String,
    /// Administrative region (state, province)
    pub region: String,
    /// ISO 3166-2 region code
    pub region_code: String,
    /// Sub-regional district, when known
    pub district: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Country display name
    pub country_name: String,
    /// Postal code, when known
    pub postal_code: String,
    /// IANA timezone identifier
    pub timezone: String,
    /// Timezone abbreviation at the resolved offset
    pub timezone_abbr: String,
    /// UTC offset in seconds
    pub utc_offset: i32,
    /// Formatted UTC offset, e.g. `UTC+5:30`
    pub utc_offset_str: String,
    /// Place latitude
    pub latitude: f64,
    /// Place longitude
    pub longitude: f64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Two-letter continent code
    pub continent_code: String,
    /// Continent display name
    pub continent_name: String,
    /// Whether the place is in a European Union member state
    pub is_eu: bool,
    /// Whether daylight saving time is active for the place
    pub dst_active: bool,
}

/// The opaque geocoding engine consumed by the loader
#[async_trait]
pub trait GeocodingEngine: Send + Sync {
    /// Bring up the engine runtime, if the target platform has a separate
    /// runtime-initialization step. Engines without one return immediately.
    async fn initialize_runtime(&self) -> EngineResult<()>;

    /// Decompress the raw downloaded payload into the engine's native
    /// dataset format
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::DecompressionFailed`] if the input is not a
    /// valid compressed payload.
    ///
    /// [`EngineError::DecompressionFailed`]: crate::errors::EngineError::DecompressionFailed
    fn decompress(&self, raw: &[u8]) -> EngineResult<Vec<u8>>;

    /// Build the in-memory spatial index and string tables from a
    /// decompressed dataset
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::IndexInitFailed`] if the bytes are not a
    /// valid dataset for the expected schema version.
    ///
    /// [`EngineError::IndexInitFailed`]: crate::errors::EngineError::IndexInitFailed
    fn initialize_index(&self, dataset: &[u8]) -> EngineResult<()>;

    /// Find the nearest place to the given coordinates
    ///
    /// Valid only after [`initialize_index`](Self::initialize_index) has
    /// succeeded; the loader guards this with its own readiness check.
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<Place>;
}
