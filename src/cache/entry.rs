//! Stored snapshot envelope.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::movies::Record;

/// The last successful payload and when it was stored.
///
/// Serialized as `{ "data": [...], "timestamp": <epoch ms> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "data")]
    pub payload: Vec<Record>,
    #[serde(rename = "timestamp")]
    pub stored_at: u64,
}

impl CacheEntry {
    pub fn new(payload: Vec<Record>, stored_at: u64) -> Self {
        Self { payload, stored_at }
    }

    /// Age relative to `now_ms`; zero if the entry claims to be from the future.
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.stored_at))
    }

    /// Strictly older than `ttl`.
    pub fn is_stale(&self, now_ms: u64, ttl: Duration) -> bool {
        self.age(now_ms) > ttl
    }
}
