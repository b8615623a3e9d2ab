//! Versioned binary snapshot of a loaded file.
//!
//! The snapshot sits next to the source file (`<stem>.rsnap`) and lets a
//! reload of an unchanged file skip parsing entirely. Layout: 4 magic bytes,
//! a little-endian format version, then the bincode-encoded body.

use crate::error::SnapshotError;
use crate::store::record::Record;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_EXT: &str = "rsnap";

const MAGIC: [u8; 4] = *b"RSNP";
const VERSION: u32 = 1;
const HEADER_LEN: usize = MAGIC.len() + 4;

#[derive(Serialize, Deserialize)]
struct SnapshotBody {
    headers: Vec<String>,
    records: Vec<Record>,
}

/// Sibling snapshot path for a source file: same directory, same stem.
pub fn snapshot_path(source: &Path) -> PathBuf {
    source.with_extension(SNAPSHOT_EXT)
}

/// True when the snapshot exists and is at least as new as the source.
/// Any metadata error counts as stale.
pub fn is_fresh(source: &Path, snapshot: &Path) -> bool {
    let source_mtime = match fs::metadata(source).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let snapshot_mtime = match fs::metadata(snapshot).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    snapshot_mtime >= source_mtime
}

/// Serialize headers and records to the snapshot file.
pub fn write(path: &Path, headers: &[String], records: &[Record]) -> Result<(), SnapshotError> {
    let body = SnapshotBody {
        headers: headers.to_vec(),
        records: records.to_vec(),
    };

    let encoded = bincode::serde::encode_to_vec(&body, bincode::config::standard())
        .map_err(|e| SnapshotError::Encode(e.to_string()))?;

    let mut buf = Vec::with_capacity(HEADER_LEN + encoded.len());
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&encoded);

    fs::write(path, buf).map_err(SnapshotError::Write)
}

/// Deserialize a snapshot back into headers and records.
pub fn read(path: &Path) -> Result<(Vec<String>, Vec<Record>), SnapshotError> {
    let data = fs::read(path).map_err(SnapshotError::Read)?;

    if data.len() < HEADER_LEN || data[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::Decode("bad snapshot magic".into()));
    }

    let version = u32::from_le_bytes(data[MAGIC.len()..HEADER_LEN].try_into().unwrap());
    if version != VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }

    let (body, _): (SnapshotBody, usize) =
        bincode::serde::decode_from_slice(&data[HEADER_LEN..], bincode::config::standard())
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;

    Ok((body.headers, body.records))
}
