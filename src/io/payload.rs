//! Write chart/series JSON.
//!
//! The payload schema is defined by `report::ChartPayload`; this module only
//! handles encoding and files.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

/// Encode any payload as pretty JSON.
pub fn to_json_string<T: Serialize>(payload: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(payload).map_err(|e| AppError::output(format!("Failed to encode JSON: {e}")))
}

/// Write a payload to a JSON file.
pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), payload)
        .map_err(|e| AppError::output(format!("Failed to write JSON '{}': {e}", path.display())))?;
    Ok(())
}
