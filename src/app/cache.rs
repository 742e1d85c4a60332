//! Durable dataset cache
//!
//! Persists exactly one decompressed dataset blob across process restarts in
//! an embedded transactional key-value store. The blob lives in a named tree
//! under a fixed key; a metadata record (schema version, content hash,
//! length, stored-at timestamp) sits beside it and is validated on read, so
//! a stale or corrupted entry reads back as a plain miss instead of being
//! handed to the engine.
//!
//! A lookup miss is a normal negative result, never an error. Only store
//! operation failures (open, read, write) surface as [`CacheError`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::cache;
use crate::errors::{CacheError, CacheResult};

/// Metadata stored beside the cached blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Dataset schema version the blob was written under
    pub schema_version: u32,
    /// MD5 digest of the blob
    pub digest: [u8; 16],
    /// Blob length in bytes
    pub length: u64,
    /// When the blob was stored
    pub stored_at: DateTime<Utc>,
}

/// Durable cache holding at most one decompressed dataset blob
pub struct DatasetCache {
    tree: sled::Tree,
    db: sled::Db,
    schema_version: u32,
}

impl DatasetCache {
    /// Open (creating if absent) the cache database at `path`
    ///
    /// The named record space is created as part of the open when missing;
    /// other trees in the same database are left untouched.
    pub fn open(path: &Path, schema_version: u32) -> CacheResult<Self> {
        let db = sled::open(path).map_err(CacheError::Open)?;
        let tree = db.open_tree(cache::TREE_NAME).map_err(CacheError::Open)?;
        debug!(path = %path.display(), "cache database opened");
        Ok(Self {
            tree,
            db,
            schema_version,
        })
    }

    /// Store a decompressed blob, overwriting any previous one
    ///
    /// Blob and metadata are written in one atomic batch and flushed before
    /// returning, so a crash after `store` completes always leaves a
    /// readable cache.
    pub async fn store(&self, blob: &[u8]) -> CacheResult<()> {
        let record = CacheRecord {
            schema_version: self.schema_version,
            digest: md5::compute(blob).0,
            length: blob.len() as u64,
            stored_at: Utc::now(),
        };
        let meta_bytes = bincode::serialize(&record)?;

        let mut batch = sled::Batch::default();
        batch.insert(cache::META_KEY, meta_bytes);
        batch.insert(cache::BLOB_KEY, blob);
        self.tree.apply_batch(batch).map_err(CacheError::Write)?;
        self.db.flush_async().await.map_err(CacheError::Write)?;

        info!(bytes = blob.len(), "dataset blob cached");
        Ok(())
    }

    /// Retrieve the stored blob, if a valid one is present
    ///
    /// A blob whose metadata is missing, carries a different schema version,
    /// or fails hash/length validation is removed and reported as a miss.
    pub async fn retrieve(&self) -> CacheResult<Option<Vec<u8>>> {
        let meta = self.tree.get(cache::META_KEY).map_err(CacheError::Read)?;
        let blob = self.tree.get(cache::BLOB_KEY).map_err(CacheError::Read)?;

        let (meta, blob) = match (meta, blob) {
            (Some(meta), Some(blob)) => (meta, blob),
            (None, None) => return Ok(None),
            _ => {
                warn!("cache entry incomplete, discarding");
                self.clear().await?;
                return Ok(None);
            }
        };

        let record: CacheRecord = match bincode::deserialize(&meta) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "cache metadata unreadable, discarding");
                self.clear().await?;
                return Ok(None);
            }
        };

        if record.schema_version != self.schema_version {
            info!(
                cached = record.schema_version,
                expected = self.schema_version,
                "cached blob has stale schema version, discarding"
            );
            self.clear().await?;
            return Ok(None);
        }

        if record.length != blob.len() as u64 || record.digest != md5::compute(&blob).0 {
            warn!("cached blob failed integrity check, discarding");
            self.clear().await?;
            return Ok(None);
        }

        debug!(bytes = blob.len(), "cache hit");
        Ok(Some(blob.to_vec()))
    }

    /// Metadata of the stored blob, if present (no integrity validation)
    pub fn record(&self) -> CacheResult<Option<CacheRecord>> {
        let meta = self.tree.get(cache::META_KEY).map_err(CacheError::Read)?;
        match meta {
            Some(meta) => Ok(Some(bincode::deserialize(&meta)?)),
            None => Ok(None),
        }
    }

    /// Remove the stored blob and its metadata
    pub async fn clear(&self) -> CacheResult<()> {
        let mut batch = sled::Batch::default();
        batch.remove(cache::META_KEY);
        batch.remove(cache::BLOB_KEY);
        self.tree.apply_batch(batch).map_err(CacheError::Write)?;
        self.db.flush_async().await.map_err(CacheError::Write)?;
        Ok(())
    }
}
