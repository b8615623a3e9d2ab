//! Error taxonomy for ingestion, snapshot persistence, and search.
//!
//! Transient I/O conditions are classified through [`Retryable`] so the
//! retry loops in the store and the engine can distinguish a busy file from
//! a genuinely malformed one. Cancellation is never retryable.

use crate::utils::Retryable;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a source file into header + data rows.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("source file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read header row: {0}")]
    Header(String),

    #[error("failed to parse row {row}: {message}")]
    Row { row: usize, message: String },

    #[error("failed to open workbook: {0}")]
    Workbook(String),

    #[error("i/o error reading source: {0}")]
    Io(#[from] io::Error),
}

/// Failures while reading or writing the binary row snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Read(io::Error),

    #[error("failed to write snapshot: {0}")]
    Write(io::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    #[error("snapshot version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Failure of the whole load pipeline.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Failure of one search call, after retries are exhausted.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search was superseded by a newer one.
    #[error("search was cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] LoadError),

    #[error("internal search failure: {0}")]
    Internal(String),
}

/// True for I/O conditions worth retrying: a file briefly held by another
/// process, an interrupted or timed-out read, or a busy storage device.
/// On Windows a file open in another program surfaces as `PermissionDenied`.
pub fn is_transient_io(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::PermissionDenied
    )
}

impl Retryable for IngestError {
    fn is_retryable(&self) -> bool {
        matches!(self, IngestError::Io(e) if is_transient_io(e))
    }
}

impl Retryable for SnapshotError {
    fn is_retryable(&self) -> bool {
        match self {
            SnapshotError::Read(e) | SnapshotError::Write(e) => is_transient_io(e),
            _ => false,
        }
    }
}

impl Retryable for LoadError {
    fn is_retryable(&self) -> bool {
        match self {
            LoadError::Ingest(e) => e.is_retryable(),
            LoadError::Snapshot(e) => e.is_retryable(),
        }
    }
}

impl Retryable for SearchError {
    fn is_retryable(&self) -> bool {
        match self {
            SearchError::Cancelled => false,
            SearchError::Store(e) => e.is_retryable(),
            SearchError::Internal(_) => false,
        }
    }
}
