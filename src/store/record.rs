use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a record: its 1-based row ordinal within the load
/// session. Ordinal, not a content key, so a reload invalidates identity.
pub type RecordId = u32;

/// Number of leading cells joined into the cached preview string
pub const PREVIEW_COLUMNS: usize = 5;

/// One logical row of the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Originating file name, display only
    pub source_name: String,
    /// First-columns summary, derived once at ingestion
    pub preview: String,
    /// Set at ingestion time, not the file's modification time
    pub loaded_at: DateTime<Utc>,
    /// Ordered cell values, positionally aligned with the header list.
    /// May be shorter than the header count; callers must bounds-check.
    pub cells: Vec<String>,
    /// Advisory, reserved for future ranking; unused by matching
    pub match_count: u32,
    /// The only field mutated after creation, written back through
    /// `RecordStore::update`
    pub added_to_history: bool,
}

impl Record {
    pub fn new(
        id: RecordId,
        source_name: String,
        cells: Vec<String>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        let preview = build_preview(&cells);
        Self {
            id,
            source_name,
            preview,
            loaded_at,
            cells,
            match_count: 0,
            added_to_history: false,
        }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

fn build_preview(cells: &[String]) -> String {
    cells
        .iter()
        .take(PREVIEW_COLUMNS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preview_joins_first_five_cells() {
        let record = Record::new(
            1,
            "data.csv".into(),
            cells(&["a", "b", "c", "d", "e", "f", "g"]),
            Utc::now(),
        );
        assert_eq!(record.preview, "a | b | c | d | e");
    }

    #[test]
    fn test_preview_with_fewer_cells() {
        let record = Record::new(1, "data.csv".into(), cells(&["a", "b"]), Utc::now());
        assert_eq!(record.preview, "a | b");
    }

    #[test]
    fn test_cell_is_bounds_checked() {
        let record = Record::new(2, "data.csv".into(), cells(&["x"]), Utc::now());
        assert_eq!(record.cell(0), Some("x"));
        assert_eq!(record.cell(5), None);
    }
}
