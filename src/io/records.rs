//! Raw record input (JSON).
//!
//! Externally computed measures arrive as already-split tuples rather than
//! text. The on-disk form is a JSON array:
//!
//! ```json
//! [{"key": "2020-01-15", "value": 42.5, "note": "...", "uri": "...", "sample_size": 12}]
//! ```
//!
//! `value` may be `null` (or absent) for a missing measurement; it becomes `NaN`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{DataPoint, KeyKind};
use crate::error::AppError;
use crate::io::ingest::{RowError, parse_key};

/// One `(key, value, note, uri, sample_size)` tuple.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub key: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub sample_size: Option<u64>,
}

impl RawRecord {
    /// Convert into a point, normalizing the key for `kind`.
    pub fn to_point(&self, kind: KeyKind) -> Result<DataPoint, String> {
        let key = parse_key(&self.key, kind)?;
        let mut point = DataPoint::new(key, self.value.unwrap_or(f64::NAN));
        if let Some(note) = self.note.as_deref().filter(|s| !s.is_empty()) {
            point = point.with_note(note);
        }
        if let Some(uri) = self.uri.as_deref().filter(|s| !s.is_empty()) {
            point = point.with_uri(uri);
        }
        if let Some(n) = self.sample_size {
            point = point.with_sample_size(n);
        }
        Ok(point)
    }
}

/// Convert records to points, skipping (and reporting) those with bad keys.
pub fn records_to_points(records: &[RawRecord], kind: KeyKind) -> (Vec<DataPoint>, Vec<RowError>) {
    let mut points = Vec::with_capacity(records.len());
    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.to_point(kind) {
            Ok(p) => points.push(p),
            Err(message) => {
                log::debug!("skipping record {}: {message}", idx + 1);
                errors.push(RowError {
                    line: idx + 1,
                    message,
                });
            }
        }
    }
    (points, errors)
}

/// Parse records from a JSON string.
pub fn parse_records(json: &str) -> Result<Vec<RawRecord>, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::config(format!("Invalid records JSON: {e}")))
}

/// Read records from a JSON file.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open records JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid records JSON '{}': {e}", path.display())))
}
