//! Criteria matcher: pure predicate over one record and one query spec.
//!
//! No side effects, no I/O. Checks run in a fixed order and short-circuit on
//! the first failure; exactly one search mode is applied at the end.

use crate::query::spec::{FilterOp, MatchMode, QuerySpec};
use crate::store::Record;
use crate::utils::levenshtein;
use regex::RegexBuilder;
use std::cmp::Ordering;
use tracing::debug;

const FUZZY_MAX_DISTANCE: usize = 2;

/// Does `record` satisfy `spec`? Column names resolve against `headers`
/// first-match-by-name; unresolvable filter columns are skipped rather than
/// failing the query.
pub fn matches(record: &Record, headers: &[String], spec: &QuerySpec) -> bool {
    if record.cells.is_empty() {
        return false;
    }

    if let (Some(from), Some(to)) = (spec.date_from, spec.date_to) {
        if record.loaded_at < from || record.loaded_at > to {
            return false;
        }
    }

    if let (Some(from), Some(to)) = (spec.time_from, spec.time_to) {
        let tod = record.loaded_at.time();
        if tod < from || tod > to {
            return false;
        }
    }

    // Nothing configured at all: pass-through
    if spec.term.is_empty() && !spec.has_filters() {
        return true;
    }

    for filter in &spec.value_filters {
        let Some(idx) = resolve_column(headers, &filter.column) else {
            continue;
        };
        let Some(cell) = record.cells.get(idx) else {
            continue;
        };
        if !apply_op(cell, filter.op, &filter.value) {
            return false;
        }
    }

    for filter in &spec.range_filters {
        let Some(idx) = resolve_column(headers, &filter.column) else {
            continue;
        };
        let Some(cell) = record.cells.get(idx) else {
            continue;
        };
        // Unparsable cells pass: non-numeric columns are range-neutral
        if let Ok(value) = cell.trim().parse::<f64>() {
            if value < filter.min || value > filter.max {
                return false;
            }
        }
    }

    if spec.term.is_empty() {
        return true;
    }

    let text = build_search_text(record, headers, &spec.columns);
    apply_mode(&text, spec)
}

/// First-match-by-name column resolution. Duplicate header names resolve to
/// the leftmost occurrence.
fn resolve_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

/// Concatenate the searched cell values into one text. With no explicit
/// column subset, every cell plus the source name is searched.
fn build_search_text(record: &Record, headers: &[String], columns: &[String]) -> String {
    if columns.is_empty() {
        let mut parts: Vec<&str> = record.cells.iter().map(String::as_str).collect();
        parts.push(&record.source_name);
        parts.join(" ")
    } else {
        columns
            .iter()
            .filter_map(|name| resolve_column(headers, name))
            .filter_map(|idx| record.cell(idx))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn apply_mode(text: &str, spec: &QuerySpec) -> bool {
    let (text_cmp, term_cmp) = if spec.case_sensitive {
        (text.to_string(), spec.term.clone())
    } else {
        (text.to_lowercase(), spec.term.to_lowercase())
    };

    match spec.mode() {
        MatchMode::Exact => text_cmp == term_cmp,
        // Fuzzy is always case-folded, same distance function as the index
        MatchMode::Fuzzy => {
            levenshtein(&text.to_lowercase(), &spec.term.to_lowercase()) <= FUZZY_MAX_DISTANCE
        }
        MatchMode::Regex => match RegexBuilder::new(&spec.term)
            .case_insensitive(!spec.case_sensitive)
            .build()
        {
            Ok(re) => re.is_match(text),
            Err(e) => {
                // Malformed pattern is a no-match, never an error
                debug!("invalid regex pattern {:?}: {e}", spec.term);
                false
            }
        },
        MatchMode::AllWords => term_cmp.split_whitespace().all(|w| text_cmp.contains(w)),
        MatchMode::AnyWord => term_cmp.split_whitespace().any(|w| text_cmp.contains(w)),
        MatchMode::Phrase | MatchMode::Plain => text_cmp.contains(&term_cmp),
    }
}

/// Apply one filter operator. Ordering and equality operators try a numeric
/// comparison of both sides first and fall back to case-insensitive ordinal
/// string comparison; the substring operators are always case-insensitive.
fn apply_op(cell: &str, op: FilterOp, value: &str) -> bool {
    match op {
        FilterOp::Contains => cell.to_lowercase().contains(&value.to_lowercase()),
        FilterOp::StartsWith => cell.to_lowercase().starts_with(&value.to_lowercase()),
        FilterOp::EndsWith => cell.to_lowercase().ends_with(&value.to_lowercase()),
        _ => {
            let ordering = compare(cell, value);
            match op {
                FilterOp::Eq => ordering == Ordering::Equal,
                FilterOp::Ne => ordering != Ordering::Equal,
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Lt => ordering == Ordering::Less,
                FilterOp::Ge => ordering != Ordering::Less,
                FilterOp::Le => ordering != Ordering::Greater,
                _ => unreachable!("substring operators handled above"),
            }
        }
    }
}

fn compare(cell: &str, value: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (cell.trim().parse::<f64>(), value.trim().parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    cell.to_lowercase().cmp(&value.to_lowercase())
}
