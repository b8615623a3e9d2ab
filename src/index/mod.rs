//! Inverted token index over loaded records.
//!
//! Keys are whole lowercased field values (cells plus the source name), not
//! whitespace-tokenized words. The index is rebuilt wholesale whenever the
//! record store's content changes; there are no incremental updates.

use crate::store::{Record, RecordId};
use crate::utils::levenshtein;
use rustc_hash::{FxHashMap, FxHashSet};

/// Fuzzy fallback accepts keys within this edit distance of the term
const FUZZY_MAX_DISTANCE: usize = 2;

/// Fuzzy fallback only fires for terms longer than this many chars
const FUZZY_MIN_TERM_LEN: usize = 2;

/// Lowercased literal -> sorted record-id postings.
#[derive(Debug, Default)]
pub struct TokenIndex {
    postings: FxHashMap<String, Vec<RecordId>>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from scratch over the given records.
    ///
    /// Every non-empty cell and the source name are indexed verbatim
    /// (lowercased). Empty cells are skipped, never indexed as "".
    pub fn build(&mut self, records: &[Record]) {
        self.postings.clear();

        for record in records {
            for cell in record.cells.iter().chain(std::iter::once(&record.source_name)) {
                if cell.is_empty() {
                    continue;
                }
                self.postings
                    .entry(cell.to_lowercase())
                    .or_default()
                    .push(record.id);
            }
        }

        // The same value can occur in several columns of one record
        for ids in self.postings.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
    }

    /// Look up the records whose indexed values relate to `term`.
    ///
    /// Three tiers, results unioned: exact key match, substring scan over
    /// all keys, and a fuzzy scan (edit distance <= 2) that fires only when
    /// the first two tiers found nothing and the term is long enough. The
    /// substring and fuzzy tiers walk the whole key set; acceptable for the
    /// file sizes this index serves, but a known scaling limit.
    pub fn lookup(&self, term: &str) -> FxHashSet<RecordId> {
        let needle = term.to_lowercase();
        let mut out = FxHashSet::default();

        if let Some(ids) = self.postings.get(&needle) {
            out.extend(ids.iter().copied());
        }

        for (key, ids) in &self.postings {
            if key.contains(&needle) {
                out.extend(ids.iter().copied());
            }
        }

        if out.is_empty() && needle.chars().count() > FUZZY_MIN_TERM_LEN {
            for (key, ids) in &self.postings {
                if levenshtein(key, &needle) <= FUZZY_MAX_DISTANCE {
                    out.extend(ids.iter().copied());
                }
            }
        }

        out
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }

    pub fn key_count(&self) -> usize {
        self.postings.len()
    }

    /// Approximate bytes held by keys and postings, for diagnostics
    pub fn memory_estimate(&self) -> u64 {
        self.postings
            .iter()
            .map(|(k, v)| k.len() as u64 + (v.len() * size_of::<RecordId>()) as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: RecordId, cells: &[&str]) -> Record {
        Record::new(
            id,
            "data.csv".into(),
            cells.iter().map(|s| s.to_string()).collect(),
            Utc::now(),
        )
    }

    fn build(records: &[Record]) -> TokenIndex {
        let mut index = TokenIndex::new();
        index.build(records);
        index
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let index = build(&[record(1, &["Hello", "World"]), record(2, &["other"])]);
        let hits = index.lookup("HELLO");
        assert!(hits.contains(&1));
        assert!(!hits.contains(&2));
    }

    #[test]
    fn test_substring_lookup() {
        let index = build(&[record(1, &["hello world"]), record(2, &["goodbye"])]);
        let hits = index.lookup("lo wor");
        assert_eq!(hits.len(), 1);
        assert!(hits.contains(&1));
    }

    #[test]
    fn test_source_name_is_indexed() {
        let index = build(&[record(7, &["x"])]);
        assert!(index.lookup("data.csv").contains(&7));
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let index = build(&[record(1, &["", "value"])]);
        assert!(!index.postings.contains_key(""));
        assert!(index.lookup("value").contains(&1));
    }

    #[test]
    fn test_fuzzy_fallback_within_distance() {
        let index = build(&[record(1, &["hello"])]);
        // No exact or substring hit, distance 1
        let hits = index.lookup("helo");
        assert!(hits.contains(&1));
    }

    #[test]
    fn test_fuzzy_fallback_rejects_far_terms() {
        let index = build(&[record(1, &["hello"])]);
        assert!(index.lookup("xyz").is_empty());
    }

    #[test]
    fn test_fuzzy_skipped_for_short_terms() {
        let index = build(&[record(1, &["abc"])]);
        // "zx" is within distance 2 of "abc" but too short to trigger fuzzy
        assert!(index.lookup("zx").is_empty());
    }

    #[test]
    fn test_fuzzy_not_used_when_substring_matches() {
        let index = build(&[record(1, &["hello"]), record(2, &["hell"])]);
        // "hell" matches both keys as a substring; fuzzy never runs
        let hits = index.lookup("hell");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_postings_deduplicated_across_columns() {
        let index = build(&[record(1, &["dup", "dup"])]);
        assert_eq!(index.postings.get("dup").unwrap(), &vec![1]);
    }

    #[test]
    fn test_clear() {
        let mut index = build(&[record(1, &["hello"])]);
        index.clear();
        assert_eq!(index.key_count(), 0);
        assert!(index.lookup("hello").is_empty());
    }
}
