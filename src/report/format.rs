//! Terminal output: series tables, skipped-row summaries, strategy listings.
//!
//! Formatting lives here so the pipeline code stays free of presentation
//! details.

use crate::domain::{DataPoint, Strategy};
use crate::series::ComputedSeries;

/// Value rounded to `precision` digits; `NaN` shows as an empty string.
pub fn display_value(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return String::new();
    }
    format!("{value:.precision$}")
}

/// Format a computed series as an aligned table plus diagnostics.
pub fn format_series_table(title: &str, strategy: Strategy, computed: &ComputedSeries, precision: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {title} ===\n"));
    out.push_str(&format!("Strategy: {} ({})\n", strategy, strategy.description()));
    out.push_str(&format!(
        "Rows: read={} | skipped={} | excluded={} | points={}\n",
        computed.rows_read,
        computed.skipped.len(),
        computed.excluded.len(),
        computed.points.len()
    ));

    if computed.points.is_empty() {
        out.push_str("\n(no points)\n");
    } else {
        out.push('\n');
        out.push_str(&format_points(&computed.points, precision));
    }

    if !computed.skipped.is_empty() {
        out.push_str("\nSkipped rows:\n");
        for e in &computed.skipped {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    if !computed.excluded.is_empty() {
        out.push_str("\nExcluded by date range:\n");
        for p in &computed.excluded {
            out.push_str(&format!("  {} {}\n", p.key, display_value(p.value, precision)));
        }
    }

    out
}

fn format_points(points: &[DataPoint], precision: usize) -> String {
    let keys: Vec<String> = points.iter().map(|p| p.key.to_string()).collect();
    let values: Vec<String> = points.iter().map(|p| display_value(p.value, precision)).collect();
    let key_w = keys.iter().map(String::len).max().unwrap_or(0).max(3);
    let val_w = values.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut out = format!("{:<key_w$}  {:>val_w$}  {:>6}  note\n", "key", "value", "n");
    for ((p, key), value) in points.iter().zip(&keys).zip(&values) {
        let n = p.sample_size.map(|n| n.to_string()).unwrap_or_default();
        let note = p.note.as_deref().unwrap_or("");
        out.push_str(&format!("{key:<key_w$}  {value:>val_w$}  {n:>6}  {note}").trim_end().to_string());
        out.push('\n');
    }
    out
}

/// One line per strategy: canonical name and description.
pub fn format_strategies() -> String {
    let mut out = String::new();
    for s in Strategy::ALL {
        out.push_str(&format!("{:<14} {}\n", s.as_str(), s.description()));
    }
    out
}
