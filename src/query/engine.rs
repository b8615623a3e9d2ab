//! Search orchestrator: caching, single-flight cancellation, retry, and
//! parallel fan-out of the criteria matcher.

use crate::config::SearchConfig;
use crate::error::{LoadError, SearchError};
use crate::index::TokenIndex;
use crate::query::cache::ResultCache;
use crate::query::matcher;
use crate::query::spec::{MatchMode, QueryKey, QuerySpec};
use crate::store::{Record, RecordId, RecordStore};
use crate::utils::{CancelToken, with_retry};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Public entry point for loading a file and searching over it.
///
/// Only one search is ever current: starting a new one cancels whatever was
/// still running, and the superseded search observes the flag at its next
/// polling point and aborts without completing.
pub struct SearchEngine {
    store: RwLock<RecordStore>,
    index: RwLock<TokenIndex>,
    cache: ResultCache,
    /// Token of the current search, swapped atomically on each new call
    current: Mutex<CancelToken>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            store: RwLock::new(RecordStore::new(
                config.retry_attempts,
                config.retry_backoff(),
            )),
            index: RwLock::new(TokenIndex::new()),
            cache: ResultCache::new(config.cache_max_size, config.cache_ttl()),
            current: Mutex::new(CancelToken::new()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SearchConfig::default())
    }

    /// Load a tabular file and rebuild the token index over it. Any cached
    /// results belong to the previous content and are dropped.
    pub fn load(&self, path: &std::path::Path) -> Result<(), LoadError> {
        let mut store = self.store.write();
        store.load(path)?;

        let mut index = self.index.write();
        index.clear();
        index.build(store.records());

        self.cache.clear();
        Ok(())
    }

    /// Drop all loaded state, the token index, and the result cache.
    pub fn clear(&self) {
        self.store.write().clear();
        self.index.write().clear();
        self.cache.clear();
    }

    /// Run one search.
    ///
    /// Cache hits for non-empty terms return immediately with no
    /// cancellation and no re-matching. Otherwise the current search is
    /// superseded and the matching pass runs under a transient-only retry
    /// loop; cancellation always propagates immediately.
    pub fn search(&self, spec: &QuerySpec) -> Result<Vec<Record>, SearchError> {
        let limit = self.effective_limit(spec);
        let key = spec.cache_key();

        if !spec.term.is_empty() {
            if let Some(mut hit) = self.cache.get(&key) {
                debug!("cache hit for term {:?}", spec.term);
                hit.truncate(limit);
                return Ok(hit);
            }
        }

        if !self.store.read().is_loaded() || spec.is_empty() {
            return Ok(Vec::new());
        }

        let token = self.supersede();

        let results = with_retry(
            self.config.retry_attempts,
            self.config.retry_backoff(),
            || self.run_search(spec, &token, limit),
        )?;

        self.cache_results(&spec.term, key, &token, &results);

        Ok(results)
    }

    /// Cache a completed result set, unless the search was superseded after
    /// its matching pass finished. Empty terms are never cached.
    fn cache_results(&self, term: &str, key: QueryKey, token: &CancelToken, results: &[Record]) {
        if term.is_empty() || token.is_cancelled() {
            return;
        }
        self.cache.insert(key, results.to_vec());
    }

    /// Cancel the current search's token and install a fresh one.
    fn supersede(&self) -> CancelToken {
        let mut slot = self.current.lock();
        slot.cancel();
        let fresh = CancelToken::new();
        *slot = fresh.clone();
        fresh
    }

    fn effective_limit(&self, spec: &QuerySpec) -> usize {
        if spec.limit == 0 {
            self.config.result_limit
        } else {
            spec.limit
        }
    }

    /// One attempt of the matching pass. Cancellation is polled while
    /// materializing records and once per record during the parallel fan-out.
    fn run_search(
        &self,
        spec: &QuerySpec,
        token: &CancelToken,
        limit: usize,
    ) -> Result<Vec<Record>, SearchError> {
        let (headers, records) = {
            let store = self.store.read();
            let candidates = self.narrow_candidates(spec);

            let mut records = Vec::new();
            for record in store.records() {
                if token.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                if candidates
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&record.id))
                {
                    records.push(record.clone());
                }
            }
            (store.column_headers(), records)
        };

        let mut results: Vec<Record> = records
            .into_par_iter()
            .filter(|record| !token.is_cancelled() && matcher::matches(record, &headers, spec))
            .collect();

        if token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        // Fan-out completion order is nondeterministic; fix a stable order
        results.sort_by_key(|r| r.id);
        results.truncate(limit);
        Ok(results)
    }

    /// Pre-filter through the token index for simple term lookups.
    ///
    /// Sound only when a plain substring search over a whitespace-free term
    /// is requested: the index covers every cell and the source name, so any
    /// record the matcher would accept is in the candidate set. All other
    /// modes scan the full record list.
    fn narrow_candidates(&self, spec: &QuerySpec) -> Option<FxHashSet<RecordId>> {
        if spec.term.is_empty() || spec.term.contains(char::is_whitespace) {
            return None;
        }
        if !matches!(spec.mode(), MatchMode::Phrase | MatchMode::Plain) {
            return None;
        }
        Some(self.index.read().lookup(&spec.term))
    }

    /// Word completions: distinct lowercased words across the source name
    /// and all cells that start with `prefix` and are strictly longer than
    /// it. Unordered-set semantics, capped at `max`.
    pub fn suggest(&self, prefix: &str, max: usize) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        if prefix.is_empty() || max == 0 {
            return Vec::new();
        }

        let store = self.store.read();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out = Vec::new();

        for record in store.records() {
            let texts = record
                .cells
                .iter()
                .chain(std::iter::once(&record.source_name));
            for text in texts {
                for word in split_words(text) {
                    let word = word.to_lowercase();
                    if word.starts_with(&prefix)
                        && word.len() > prefix.len()
                        && seen.insert(word.clone())
                    {
                        out.push(word);
                        if out.len() == max {
                            return out;
                        }
                    }
                }
            }
        }

        out
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_searches(&self) -> usize {
        self.cache.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.read().is_loaded()
    }

    pub fn row_count(&self) -> usize {
        self.store.read().row_count()
    }

    pub fn column_headers(&self) -> Vec<String> {
        self.store.read().column_headers()
    }

    pub fn get_record(&self, id: RecordId) -> Option<Record> {
        self.store.read().get(id)
    }

    /// Write back a mutated record (history flag) through the store.
    /// Callers must not race this against an in-flight search.
    pub fn update_record(&self, record: Record) {
        self.store.write().update(record);
    }

    /// Records plus index footprint, for operator diagnostics only.
    pub fn memory_estimate(&self) -> u64 {
        self.store.read().memory_estimate() + self.index.read().memory_estimate()
    }
}

/// Split on any non-alphanumeric boundary, dropping empties.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
}
