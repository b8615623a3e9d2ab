//! TTL- and capacity-bounded result cache.
//!
//! Keyed by the normalized query key. Eviction on overflow removes the
//! single oldest entry by insertion timestamp, not by last access.

use crate::query::spec::QueryKey;
use crate::store::Record;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

struct CacheEntry {
    results: Vec<Record>,
    inserted_at: Instant,
}

/// Concurrent map of query key to cached result list.
pub struct ResultCache {
    entries: Mutex<FxHashMap<QueryKey, CacheEntry>>,
    max_size: usize,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            max_size: max_size.max(1),
            ttl,
        }
    }

    /// Return a clone of the cached results if the entry is still younger
    /// than the TTL. An expired entry is purged on this lookup and treated
    /// as a miss.
    pub fn get(&self, key: &QueryKey) -> Option<Vec<Record>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.results.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert, evicting the oldest entry first when the cache is full and
    /// the key is new.
    pub fn insert(&self, key: QueryKey, results: Vec<Record>) {
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                results,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
