//! In-memory result cache.
//!
//! Entries live in a `DashMap` keyed by a hash of the reference; expiry is
//! checked on read, there is no background sweep. The recent-reference list
//! is mutated only by successful writes.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use common::config::CacheConfig;
use common::{ProductReference, RecommendationResult};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Cache key for a reference. Free text that differs from the canonical URL
/// is mixed in so distinct queries that synthesize the same URL never share
/// an entry.
pub fn cache_key(reference: &ProductReference) -> String {
    let mut hasher = Sha256::new();
    hasher.update(reference.canonical_url.as_bytes());
    if !reference.raw_text.is_empty() && reference.raw_text != reference.canonical_url {
        hasher.update(b"\n");
        hasher.update(reference.raw_text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: RecommendationResult,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Process-local store of validated results plus the recent list. Starts
/// empty; needs no teardown.
#[derive(Debug)]
pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
    recent: Mutex<VecDeque<(String, ProductReference)>>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.recent_capacity)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, or `None`. An expired entry is evicted here.
    pub fn get(&self, key: &str) -> Option<RecommendationResult> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(self.ttl) {
                return Some(entry.payload.clone());
            }
        }
        // Only drop it if it is still expired; a concurrent put may have
        // replaced it since the read above.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(self.ttl))
            .is_some()
        {
            debug!("cache entry {} expired", short(key));
        }
        None
    }

    /// Overwrite the entry for `key` and move its reference to the front of
    /// the recent list.
    pub fn put(&self, key: &str, result: RecommendationResult) {
        let reference = result.reference.clone();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                payload: result,
                created_at: Instant::now(),
            },
        );

        match self.recent.lock() {
            Ok(mut recent) => {
                recent.retain(|(k, _)| k != key);
                recent.push_front((key.to_string(), reference));
                recent.truncate(self.capacity);
            }
            Err(_) => warn!("recent list lock poisoned; skipping update"),
        }
    }

    /// Recently cached references, most recent first.
    pub fn recent(&self) -> Vec<ProductReference> {
        self.recent
            .lock()
            .map(|recent| recent.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of stored entries, expired ones included until next read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
