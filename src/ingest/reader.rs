//! Raw-directory merge and cleaned-CSV round-trip.
//!
//! Every raw file is parsed independently; a broken file is logged and
//! skipped, never fatal. Only an empty result set aborts the merge.

use std::fs;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{info, warn};

use super::schema::ColumnMap;
use crate::model::{IngestError, VisitRecord};

/// Candidate delimiters, in preference order on ties.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// All `*.csv` files directly under `dir`, sorted by name.
pub fn list_raw_files(dir: &str) -> Result<Vec<PathBuf>, IngestError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Guess the field delimiter from the first non-empty line.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let header = sample
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let mut best = b',';
    let mut best_count = 0usize;
    for delim in DELIMITERS {
        let count = header.bytes().filter(|b| *b == delim).count();
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    best
}

/// Parse one raw visitation CSV into records, dropping malformed rows.
pub fn read_visits_file(path: &Path) -> Result<Vec<VisitRecord>, IngestError> {
    let file_path = path.display().to_string();
    let content = fs::read_to_string(path)?;
    let delimiter = sniff_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let map = ColumnMap::resolve(&headers).map_err(|missing| IngestError::MissingColumns {
        file: file_path.clone(),
        missing,
    })?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        match row {
            Ok(record) => match map.record_to_visit(&record) {
                Some(visit) => records.push(visit),
                None => dropped += 1,
            },
            Err(_) => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("{}: dropped {} malformed rows", file_path, dropped);
    }
    Ok(records)
}

/// Merge every raw file under `raw_dir` into one record list. Files are
/// parsed on blocking worker threads, one task per file.
pub async fn merge_raw_dir(raw_dir: &str) -> Result<Vec<VisitRecord>, IngestError> {
    let files = list_raw_files(raw_dir)?;
    info!("Found {} CSV files to merge", files.len());

    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            tokio::task::spawn_blocking(move || {
                let result = read_visits_file(&path);
                (path, result)
            })
        })
        .collect();

    let mut merged = Vec::new();
    let mut usable_files = 0usize;
    for joined in join_all(tasks).await {
        let (path, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!("merge worker failed: {}", e);
                continue;
            }
        };
        match result {
            Ok(records) => {
                info!("{}: {} rows", path.display(), records.len());
                merged.extend(records);
                usable_files += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    if usable_files == 0 {
        return Err(IngestError::NoUsableFiles(raw_dir.to_string()));
    }
    info!("Merged {} rows from {} usable files", merged.len(), usable_files);
    Ok(merged)
}

/// Write the cleaned CSV, creating parent directories as needed.
pub fn write_cleaned_csv(path: &str, records: &[VisitRecord]) -> Result<(), IngestError> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a cleaned CSV written by [`write_cleaned_csv`].
pub fn read_cleaned_csv(path: &str) -> Result<Vec<VisitRecord>, IngestError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: VisitRecord = row?;
        records.push(record);
    }
    Ok(records)
}
