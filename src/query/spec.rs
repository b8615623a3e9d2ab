use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Comparison operator for a column-value filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOp {
    /// Parse an operator from its display form (`=`, `!=`, `>`, `<`, `>=`,
    /// `<=`, `Contains`, `Starts With`, `Ends With`). Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Some(FilterOp::Eq),
            "!=" | "<>" | "ne" => Some(FilterOp::Ne),
            ">" | "gt" => Some(FilterOp::Gt),
            "<" | "lt" => Some(FilterOp::Lt),
            ">=" | "ge" => Some(FilterOp::Ge),
            "<=" | "le" => Some(FilterOp::Le),
            "contains" => Some(FilterOp::Contains),
            "starts with" | "startswith" => Some(FilterOp::StartsWith),
            "ends with" | "endswith" => Some(FilterOp::EndsWith),
            _ => None,
        }
    }
}

/// `column op value` predicate against a named column.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

/// Inclusive numeric range over a named column.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

/// Effective search mode, after flag precedence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Fuzzy,
    Regex,
    AllWords,
    AnyWord,
    Phrase,
    Plain,
}

/// Immutable description of one search request.
///
/// Mode flags are mutually exclusive in effect: when several are set, the
/// fixed precedence in [`QuerySpec::mode`] picks exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub term: String,
    pub exact_match: bool,
    pub fuzzy_search: bool,
    pub use_regex: bool,
    pub all_words: bool,
    pub any_word: bool,
    pub phrase: bool,
    pub case_sensitive: bool,
    /// Column subset to search; empty means all columns plus the source name
    pub columns: Vec<String>,
    pub value_filters: Vec<ValueFilter>,
    pub range_filters: Vec<RangeFilter>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    /// Result cap; 0 means "use the engine's configured default"
    pub limit: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            term: String::new(),
            exact_match: false,
            fuzzy_search: false,
            use_regex: false,
            all_words: false,
            any_word: false,
            phrase: false,
            case_sensitive: false,
            columns: Vec::new(),
            value_filters: Vec::new(),
            range_filters: Vec::new(),
            date_from: None,
            date_to: None,
            time_from: None,
            time_to: None,
            limit: 0,
        }
    }
}

impl QuerySpec {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Fixed mode precedence: exact, fuzzy, regex, all-words, any-word,
    /// phrase, then plain substring as the fallback default.
    pub fn mode(&self) -> MatchMode {
        if self.exact_match {
            MatchMode::Exact
        } else if self.fuzzy_search {
            MatchMode::Fuzzy
        } else if self.use_regex {
            MatchMode::Regex
        } else if self.all_words {
            MatchMode::AllWords
        } else if self.any_word {
            MatchMode::AnyWord
        } else if self.phrase {
            MatchMode::Phrase
        } else {
            MatchMode::Plain
        }
    }

    pub fn has_filters(&self) -> bool {
        !self.value_filters.is_empty() || !self.range_filters.is_empty()
    }

    pub fn has_date_or_time_range(&self) -> bool {
        (self.date_from.is_some() && self.date_to.is_some())
            || (self.time_from.is_some() && self.time_to.is_some())
    }

    /// An entirely empty query: no term, no filters, no ranges.
    pub fn is_empty(&self) -> bool {
        self.term.is_empty() && !self.has_filters() && !self.has_date_or_time_range()
    }

    /// Normalized cache key. Two specs differing only in the order of their
    /// filter lists produce equal keys; any other field difference misses.
    pub fn cache_key(&self) -> QueryKey {
        let mut value_filters: Vec<(String, FilterOp, String)> = self
            .value_filters
            .iter()
            .map(|f| (f.column.clone(), f.op, f.value.clone()))
            .collect();
        value_filters.sort();

        let mut range_filters: Vec<(String, u64, u64)> = self
            .range_filters
            .iter()
            .map(|f| (f.column.clone(), f.min.to_bits(), f.max.to_bits()))
            .collect();
        range_filters.sort();

        QueryKey {
            term: self.term.clone(),
            exact_match: self.exact_match,
            fuzzy_search: self.fuzzy_search,
            use_regex: self.use_regex,
            all_words: self.all_words,
            any_word: self.any_word,
            phrase: self.phrase,
            case_sensitive: self.case_sensitive,
            columns: self.columns.clone(),
            value_filters,
            range_filters,
            date_from: self.date_from.map(|d| d.timestamp_millis()),
            date_to: self.date_to.map(|d| d.timestamp_millis()),
            time_from: self.time_from.map(time_key),
            time_to: self.time_to.map(time_key),
            limit: self.limit,
        }
    }
}

fn time_key(t: NaiveTime) -> (u32, u32) {
    use chrono::Timelike;
    (t.num_seconds_from_midnight(), t.nanosecond())
}

/// Hashable, order-normalized form of a [`QuerySpec`], used as the result
/// cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    term: String,
    exact_match: bool,
    fuzzy_search: bool,
    use_regex: bool,
    all_words: bool,
    any_word: bool,
    phrase: bool,
    case_sensitive: bool,
    columns: Vec<String>,
    value_filters: Vec<(String, FilterOp, String)>,
    range_filters: Vec<(String, u64, u64)>,
    date_from: Option<i64>,
    date_to: Option<i64>,
    time_from: Option<(u32, u32)>,
    time_to: Option<(u32, u32)>,
    limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_precedence_exact_beats_fuzzy() {
        let spec = QuerySpec {
            exact_match: true,
            fuzzy_search: true,
            use_regex: true,
            ..QuerySpec::new("x")
        };
        assert_eq!(spec.mode(), MatchMode::Exact);
    }

    #[test]
    fn test_mode_precedence_order() {
        let mut spec = QuerySpec::new("x");
        assert_eq!(spec.mode(), MatchMode::Plain);
        spec.phrase = true;
        assert_eq!(spec.mode(), MatchMode::Phrase);
        spec.any_word = true;
        assert_eq!(spec.mode(), MatchMode::AnyWord);
        spec.all_words = true;
        assert_eq!(spec.mode(), MatchMode::AllWords);
        spec.use_regex = true;
        assert_eq!(spec.mode(), MatchMode::Regex);
        spec.fuzzy_search = true;
        assert_eq!(spec.mode(), MatchMode::Fuzzy);
        spec.exact_match = true;
        assert_eq!(spec.mode(), MatchMode::Exact);
    }

    #[test]
    fn test_cache_key_ignores_filter_order() {
        let f1 = ValueFilter {
            column: "Age".into(),
            op: FilterOp::Gt,
            value: "26".into(),
        };
        let f2 = ValueFilter {
            column: "Name".into(),
            op: FilterOp::Contains,
            value: "a".into(),
        };

        let a = QuerySpec {
            value_filters: vec![f1.clone(), f2.clone()],
            ..QuerySpec::new("term")
        };
        let b = QuerySpec {
            value_filters: vec![f2, f1],
            ..QuerySpec::new("term")
        };

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_range_filter_order() {
        let r1 = RangeFilter {
            column: "Age".into(),
            min: 1.0,
            max: 2.0,
        };
        let r2 = RangeFilter {
            column: "Size".into(),
            min: 3.0,
            max: 4.0,
        };

        let a = QuerySpec {
            range_filters: vec![r1.clone(), r2.clone()],
            ..QuerySpec::new("term")
        };
        let b = QuerySpec {
            range_filters: vec![r2, r1],
            ..QuerySpec::new("term")
        };

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_differs_on_other_fields() {
        let a = QuerySpec::new("term");
        let b = QuerySpec {
            case_sensitive: true,
            ..QuerySpec::new("term")
        };
        let c = QuerySpec {
            limit: 5,
            ..QuerySpec::new("term")
        };
        assert_ne!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
        assert_ne!(b.cache_key(), c.cache_key());
    }

    #[test]
    fn test_filter_op_parse() {
        assert_eq!(FilterOp::parse(">="), Some(FilterOp::Ge));
        assert_eq!(FilterOp::parse("Contains"), Some(FilterOp::Contains));
        assert_eq!(FilterOp::parse("Starts With"), Some(FilterOp::StartsWith));
        assert_eq!(FilterOp::parse("endswith"), Some(FilterOp::EndsWith));
        assert_eq!(FilterOp::parse("~"), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(QuerySpec::default().is_empty());
        assert!(!QuerySpec::new("x").is_empty());

        let with_filter = QuerySpec {
            value_filters: vec![ValueFilter {
                column: "Age".into(),
                op: FilterOp::Gt,
                value: "1".into(),
            }],
            ..QuerySpec::default()
        };
        assert!(!with_filter.is_empty());

        let with_dates = QuerySpec {
            date_from: Some(Utc::now()),
            date_to: Some(Utc::now()),
            ..QuerySpec::default()
        };
        assert!(!with_dates.is_empty());
    }
}
