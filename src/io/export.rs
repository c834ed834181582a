//! Export a resolved series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! `key,value,note,uri,sample_size`, with values at display precision and `NaN`
//! as an empty cell.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::DataPoint;
use crate::error::AppError;
use crate::report::display_value;

/// Write points as CSV to any writer.
pub fn write_points_csv<W: Write>(writer: W, points: &[DataPoint], precision: usize) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["key", "value", "note", "uri", "sample_size"])
        .map_err(|e| AppError::output(format!("Failed to write CSV header: {e}")))?;

    for p in points {
        let sample_size = p.sample_size.map(|n| n.to_string()).unwrap_or_default();
        wtr.write_record([
            p.key.to_string().as_str(),
            display_value(p.value, precision).as_str(),
            p.note.as_deref().unwrap_or(""),
            p.uri.as_deref().unwrap_or(""),
            sample_size.as_str(),
        ])
        .map_err(|e| AppError::output(format!("Failed to write CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::output(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Write points to a CSV file.
pub fn write_points_csv_file(path: &Path, points: &[DataPoint], precision: usize) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_points_csv(file, points, precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PointKey;
    use chrono::NaiveDate;

    #[test]
    fn csv_quotes_notes_and_blanks_nan() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        let points = vec![
            DataPoint::new(PointKey::Date(d), 15.0)
                .with_note("Average of 2 values found, see sources")
                .with_sample_size(2),
            DataPoint::new(PointKey::Date(d.succ_opt().unwrap()), f64::NAN),
        ];
        let mut buf = Vec::new();
        write_points_csv(&mut buf, &points, 2).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "key,value,note,uri,sample_size");
        assert_eq!(lines[1], "2020-01-15,15.00,\"Average of 2 values found, see sources\",,2");
        assert_eq!(lines[2], "2020-01-16,,,,");
    }
}
