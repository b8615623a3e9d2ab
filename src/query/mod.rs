pub mod cache;
pub mod engine;
pub mod matcher;
pub mod spec;

pub use cache::ResultCache;
pub use engine::SearchEngine;
pub use spec::{FilterOp, MatchMode, QueryKey, QuerySpec, RangeFilter, ValueFilter};
