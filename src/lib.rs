//! # rowsift - search engine for tabular files
//!
//! rowsift loads a spreadsheet or delimited file, builds an in-memory
//! inverted index over its cells, and serves ad-hoc queries with sub-second
//! latency, result caching, and cooperative cancellation of superseded
//! searches.
//!
//! ## Architecture
//!
//! - [`store`] - record ingestion and the durable binary snapshot cache
//! - [`index`] - inverted token index with a Levenshtein fuzzy fallback
//! - [`query`] - query specs, the criteria matcher, the result cache, and
//!   the search orchestrator
//! - [`output`] - terminal result formatting
//! - [`config`] / [`error`] / [`utils`] - configuration, error taxonomy,
//!   and small shared pieces (edit distance, cancellation, retry)
//!
//! ## Quick Start
//!
//! ```ignore
//! use rowsift::{QuerySpec, SearchEngine};
//! use std::path::Path;
//!
//! let engine = SearchEngine::with_defaults();
//! engine.load(Path::new("people.csv"))?;
//!
//! let results = engine.search(&QuerySpec::new("bob"))?;
//! for record in results {
//!     println!("{}: {}", record.id, record.preview);
//! }
//! ```
//!
//! Loading writes a binary snapshot next to the source file so an unchanged
//! file re-loads without parsing. Queries support exact, fuzzy, regex,
//! all-words, any-word, phrase and plain substring modes plus column-value
//! and numeric-range filters; results are cached per normalized query and a
//! new search cancels any still-running one.

pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod store;
pub mod utils;

pub use config::SearchConfig;
pub use error::{IngestError, LoadError, SearchError, SnapshotError};
pub use query::{FilterOp, QuerySpec, RangeFilter, SearchEngine, ValueFilter};
pub use store::{Record, RecordId, RecordStore};
