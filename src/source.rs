//! Listing snapshot loader.
//!
//! Reads a query-result export (`{"query_result": {"data": {"rows": [...]}}}`)
//! or a bare JSON array of rows from disk. Files ending in `.gz` are
//! decompressed transparently. Rows that cannot be read as a [`RawListing`]
//! are skipped with a warning and counted.

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::{info, warn};

use crate::config;
use crate::error::{CatalogError, Result};
use crate::models::RawListing;

/// Listings read from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub listings: Vec<RawListing>,
    /// Rows that were present but not readable as listings.
    pub malformed: usize,
}

impl Snapshot {
    /// Total rows seen, readable or not.
    pub fn rows(&self) -> usize {
        self.listings.len() + self.malformed
    }
}

/// Extract listings from an already-parsed snapshot document.
pub fn parse_snapshot(doc: Value) -> Result<Snapshot> {
    let rows = match doc {
        Value::Array(rows) => rows,
        mut doc => match doc.pointer_mut("/query_result/data/rows").map(Value::take) {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(CatalogError::InvalidArgument(
                    "snapshot has no query_result.data.rows array".into(),
                ))
            }
        },
    };

    let mut snapshot = Snapshot::default();
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawListing>(row) {
            Ok(listing) => snapshot.listings.push(listing),
            Err(e) => {
                warn!(row = i, error = %e, "skipping malformed row");
                snapshot.malformed += 1;
            }
        }
    }
    Ok(snapshot)
}

/// Load and parse a snapshot file (handles `.gz` transparently).
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let contents = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let file = fs::File::open(path)?;
        let mut decoder = BufReader::new(GzDecoder::new(BufReader::new(file)));
        let mut contents = String::new();
        decoder.read_to_string(&mut contents)?;
        contents
    } else {
        fs::read_to_string(path)?
    };

    let snapshot = parse_snapshot(serde_json::from_str(&contents)?)?;
    info!(
        path = %path.display(),
        listings = snapshot.listings.len(),
        malformed = snapshot.malformed,
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Load the snapshot from [`config::default_snapshot_path`].
pub fn load_default_snapshot() -> Result<Snapshot> {
    load_snapshot(config::default_snapshot_path())
}
