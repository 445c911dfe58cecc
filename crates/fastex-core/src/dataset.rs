//! JSONL dataset loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Record;

/// Reads one record per non-blank line of `path`, preserving file order.
pub fn load_jsonl(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    let records = read_jsonl(BufReader::new(file), path)?;
    tracing::info!(count = records.len(), path = %path.display(), "loaded records");
    Ok(records)
}

/// `origin` is only used to label errors.
pub fn read_jsonl<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| Error::Io { path: origin.to_path_buf(), source })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| Error::Json {
            path: origin.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
