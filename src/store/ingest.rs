//! Source-file ingestion: header row + data rows as parallel string arrays.
//!
//! Format is chosen by extension: `.xlsx`/`.xls` are read as spreadsheets
//! through calamine, everything else as delimited text with the delimiter
//! sniffed from the header line.

use crate::error::IngestError;
use calamine::{Data, Reader, open_workbook_auto};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A decoded source file: one header row plus zero or more data rows.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read a tabular file into headers and rows.
pub fn read_table(path: &Path) -> Result<RawTable, IngestError> {
    if !path.exists() {
        return Err(IngestError::Missing(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xls" => read_spreadsheet(path),
        _ => read_delimited(path),
    }
}

fn read_spreadsheet(path: &Path) -> Result<RawTable, IngestError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Header("workbook has no sheets".into()))?
        .map_err(|e| IngestError::Workbook(e.to_string()))?;

    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| IngestError::Header("sheet has no header row".into()))?
        .iter()
        .map(cell_to_string)
        .collect();

    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn read_delimited(path: &Path) -> Result<RawTable, IngestError> {
    let delimiter = sniff_delimiter(path)?;

    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(|e| csv_error(e, 1))?;

    let mut records = reader.into_records();

    let headers: Vec<String> = match records.next() {
        None => return Err(IngestError::Header("file has no header row".into())),
        Some(Err(e)) => return Err(header_error(e)),
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
    };

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        // Data rows start at source row 2
        let record = record.map_err(|e| csv_error(e, i + 2))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

fn csv_error(e: csv::Error, row: usize) -> IngestError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => IngestError::Io(io),
        other => IngestError::Row {
            row,
            message: format!("{other:?}"),
        },
    }
}

/// Header-row failures keep their I/O kind so the transient classifier can
/// see them; only parse failures become header errors.
fn header_error(e: csv::Error) -> IngestError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => IngestError::Io(io),
        other => IngestError::Header(format!("{other:?}")),
    }
}

/// Pick the field delimiter: `.tsv`/`.tab` force tabs, otherwise the header
/// line is scanned and the most frequent of tab/semicolon/comma wins (comma
/// on a tie or when none appear).
fn sniff_delimiter(path: &Path) -> Result<u8, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext == "tsv" || ext == "tab" {
        return Ok(b'\t');
    }

    let file = File::open(path)?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;

    let candidates = [b'\t', b';', b','];
    let counts: Vec<usize> = candidates
        .iter()
        .map(|&d| first_line.bytes().filter(|&b| b == d).count())
        .collect();

    let mut best = b',';
    let mut best_count = 0;
    for (&delim, &count) in candidates.iter().zip(&counts) {
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    Ok(best)
}
