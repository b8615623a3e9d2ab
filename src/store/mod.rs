//! Record store: owns the decoded rows of the loaded file and their binary
//! snapshot on disk.

pub mod ingest;
pub mod record;
pub mod snapshot;

pub use record::{PREVIEW_COLUMNS, Record, RecordId};

use crate::error::{IngestError, LoadError};
use crate::utils::with_retry;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rough per-record overhead for the memory estimate, beyond cell bytes
const RECORD_OVERHEAD_BYTES: u64 = 96;

/// Ordered, immutable-by-convention sequence of loaded records plus the
/// sibling snapshot used to skip re-parsing unchanged source files.
#[derive(Debug)]
pub struct RecordStore {
    path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    headers: Vec<String>,
    records: Vec<Record>,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(150))
    }
}

impl RecordStore {
    pub fn new(retry_attempts: u32, retry_backoff: Duration) -> Self {
        Self {
            path: None,
            snapshot_path: None,
            headers: Vec::new(),
            records: Vec::new(),
            retry_attempts,
            retry_backoff,
        }
    }

    /// Ingest a file, replacing any previously loaded content.
    ///
    /// When a snapshot at least as new as the source exists it is loaded
    /// directly; otherwise the source is parsed (row 1 = headers, records
    /// from row 2) and a fresh snapshot is written. The whole pipeline is
    /// retried on transient failures; the snapshot write is retried
    /// independently and its final failure is logged, not propagated.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let (attempts, backoff) = (self.retry_attempts, self.retry_backoff);
        with_retry(attempts, backoff, || self.load_once(path))
    }

    fn load_once(&mut self, path: &Path) -> Result<(), LoadError> {
        if !path.exists() {
            return Err(IngestError::Missing(path.to_path_buf()).into());
        }

        let snap = snapshot::snapshot_path(path);

        if snapshot::is_fresh(path, &snap) {
            match snapshot::read(&snap) {
                Ok((headers, records)) => {
                    debug!("loaded {} records from snapshot {}", records.len(), snap.display());
                    self.install(path, snap, headers, records);
                    return Ok(());
                }
                Err(e) => {
                    warn!("snapshot unreadable, re-parsing source: {e}");
                }
            }
        }

        let table = ingest::read_table(path)?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let loaded_at = Utc::now();

        let records: Vec<Record> = table
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| Record::new(i as RecordId + 1, source_name.clone(), cells, loaded_at))
            .collect();

        info!("parsed {} records from {}", records.len(), path.display());

        // Best effort: a parse that succeeds must not fail because the
        // snapshot could not be written.
        if let Err(e) = with_retry(self.retry_attempts, self.retry_backoff, || {
            snapshot::write(&snap, &table.headers, &records)
        }) {
            warn!("failed to write snapshot {}: {e}", snap.display());
        }

        self.install(path, snap, table.headers, records);
        Ok(())
    }

    fn install(
        &mut self,
        path: &Path,
        snapshot_path: PathBuf,
        headers: Vec<String>,
        records: Vec<Record>,
    ) {
        self.path = Some(path.to_path_buf());
        self.snapshot_path = Some(snapshot_path);
        self.headers = headers;
        self.records = records;
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_headers(&self) -> Vec<String> {
        self.headers.clone()
    }

    /// True only when a file is loaded and it still exists on disk right now.
    pub fn is_loaded(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    /// Replace the record with a matching id in place, then re-persist the
    /// snapshot on a background thread. The rewrite is fire-and-forget: on
    /// failure the on-disk snapshot stays stale relative to memory until the
    /// next full load.
    pub fn update(&mut self, record: Record) {
        let Some(slot) = self.records.iter_mut().find(|r| r.id == record.id) else {
            return;
        };
        *slot = record;

        if let Some(snap) = self.snapshot_path.clone() {
            let headers = self.headers.clone();
            let records = self.records.clone();
            std::thread::spawn(move || {
                if let Err(e) = snapshot::write(&snap, &headers, &records) {
                    warn!("background snapshot rewrite failed: {e}");
                }
            });
        }
    }

    /// Drop all in-memory state and delete the snapshot file if present.
    /// Snapshot deletion errors are non-fatal.
    pub fn clear(&mut self) {
        if let Some(snap) = self.snapshot_path.take() {
            if let Err(e) = std::fs::remove_file(&snap) {
                debug!("could not delete snapshot {}: {e}", snap.display());
            }
        }
        self.path = None;
        self.headers.clear();
        self.records.clear();
    }

    /// Coarse heuristic for operator diagnostics; never used to enforce
    /// limits.
    pub fn memory_estimate(&self) -> u64 {
        let cell_bytes: u64 = self
            .records
            .iter()
            .map(|r| {
                r.cells.iter().map(|c| c.len() as u64).sum::<u64>()
                    + r.source_name.len() as u64
                    + r.preview.len() as u64
            })
            .sum();
        let header_bytes: u64 = self.headers.iter().map(|h| h.len() as u64).sum();
        self.records.len() as u64 * RECORD_OVERHEAD_BYTES + cell_bytes + header_bytes
    }
}
