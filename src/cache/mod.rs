//! Snapshot cache for the movie collection.
//!
//! # Data Flow
//! ```text
//! read():  store.rs bytes → entry.rs decode → Some(CacheEntry) | None
//! write(): CacheEntry → JSON → store.rs atomic replace
//! ```
//!
//! # Design Decisions
//! - A single slot under a fixed key; last write wins
//! - Missing, unreadable or malformed data reads as "no entry", never an error
//! - Freshness is decided by the caller; the cache only records `stored_at`

pub mod entry;
pub mod store;

use std::sync::Arc;

use thiserror::Error;

pub use entry::CacheEntry;
pub use store::{FileStore, KvStore, MemoryStore};

use crate::movies::Record;

/// Errors surfaced by `MovieCache::write`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The single cached snapshot of the movie collection.
#[derive(Clone)]
pub struct MovieCache {
    store: Arc<dyn KvStore>,
    key: String,
}

impl MovieCache {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Return the stored entry when present and structurally valid.
    pub fn read(&self) -> Option<CacheEntry> {
        let bytes = match self.store.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cache unreadable, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "Discarding malformed cache entry");
                None
            }
        }
    }

    /// Replace the stored entry.
    pub fn write(&self, payload: &[Record], now_ms: u64) -> Result<(), CacheError> {
        #[derive(serde::Serialize)]
        struct Borrowed<'a> {
            data: &'a [Record],
            timestamp: u64,
        }

        let bytes = serde_json::to_vec(&Borrowed {
            data: payload,
            timestamp: now_ms,
        })?;
        self.store.put(&self.key, &bytes)?;
        tracing::debug!(key = %self.key, records = payload.len(), "Cache updated");
        Ok(())
    }
}

impl std::fmt::Debug for MovieCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieCache").field("key", &self.key).finish()
    }
}
