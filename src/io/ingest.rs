//! Delimited-text ingest.
//!
//! Turns pasted `key,value[,note[,uri]]` lines into raw `DataPoint`s.
//!
//! Design goals:
//! - **Never fatal**: a malformed row is skipped and recorded, not raised
//! - **File order preserved**: no sorting, no deduplication at this stage
//! - **Pure**: the same text always yields the same points

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{DataPoint, KeyKind, PointKey};

/// A row that was skipped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based source line of the row.
    pub line: usize,
    pub message: String,
}

/// Ingest output: points in file order + what was dropped.
#[derive(Debug, Clone)]
pub struct ParsedText {
    pub points: Vec<DataPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Parse delimited text into points keyed by `kind`.
pub fn parse_points(text: &str, kind: KeyKind) -> ParsedText {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;

        // Blank lines produce no record, so the record index is only a fallback.
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(idx + 1, |p| p.line() as usize);
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);

        match parse_row(&record, kind) {
            Ok(point) => points.push(point),
            Err(message) => {
                log::debug!("skipping row {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if rows_read > 0 && points.is_empty() {
        log::warn!("{rows_read} row(s) read but none could be parsed as {} points", kind.display_name());
    }

    ParsedText {
        points,
        row_errors,
        rows_read,
    }
}

fn parse_row(record: &StringRecord, kind: KeyKind) -> Result<DataPoint, String> {
    if record.len() < 2 {
        return Err(format!("Expected at least 2 fields, found {}.", record.len()));
    }

    let key = parse_key(record.get(0).unwrap_or_default(), kind)?;

    let raw_value = record.get(1).unwrap_or_default();
    let value = raw_value
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw_value}'."))?;

    let mut point = DataPoint::new(key, value);
    if let Some(note) = get_optional(record, 2) {
        point = point.with_note(note);
    }
    if let Some(uri) = get_optional(record, 3) {
        point = point.with_uri(uri);
    }
    Ok(point)
}

fn get_optional(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Normalize a raw key for a series of the given kind.
pub fn parse_key(raw: &str, kind: KeyKind) -> Result<PointKey, String> {
    let raw = raw.trim().trim_start_matches('\u{feff}');
    if raw.is_empty() {
        return Err("Missing key.".to_string());
    }
    match kind {
        KeyKind::Date => parse_date(raw).map(PointKey::Date),
        KeyKind::Name => Ok(PointKey::Name(raw.to_string())),
    }
}

/// Parse a date key, dropping any time-of-day component.
///
/// Pasted spreadsheet data is usually `MM/DD/YYYY`; exports from other tools
/// tend to be ISO. Date-time values are truncated to their date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected MM/DD/YYYY or YYYY-MM-DD."
    ))
}
