//! Chart JSON payload for the client-side charting library.
//!
//! Shape (optional fields are omitted rather than `null`):
//!
//! ```text
//! { title, description?, units?, goal?, range_min?, range_max?,
//!   x_axis_type?, frequency?, start?, end?, force_crop?,
//!   series: [ { title, description?, display_format,
//!               data: [ [key, { value, title, note?, uri? }], ... ] } ] }
//! ```
//!
//! Date keys are ISO 8601 date-times without fractional seconds; `NaN`
//! values are `null`. Series without data are left out.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::chart::Chart;
use crate::domain::{DataPoint, Frequency, KeyKind, PointKey};
use crate::series::{ComputedSeries, DataSeries};

pub mod format;

pub use format::*;

/// Which annotations make it into the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadOptions {
    pub include_notes: bool,
    pub include_uris: bool,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            include_notes: true,
            include_uris: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_crop: Option<bool>,
    pub series: Vec<SeriesPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub display_format: String,
    pub data: Vec<(String, PointPayload)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPayload {
    pub value: Option<f64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Build the payload for a chart from its computed series (same order as
/// `chart.series()`).
pub fn chart_payload(chart: &Chart, computed: &[Arc<ComputedSeries>], options: PayloadOptions) -> ChartPayload {
    let series = chart
        .series()
        .iter()
        .zip(computed)
        .filter_map(|(s, c)| series_payload(s, c, options))
        .collect();

    let is_time = chart.key_kind() == KeyKind::Date;
    let range = chart.range();

    ChartPayload {
        title: chart.title.clone(),
        description: chart.description.clone(),
        units: chart.units.clone(),
        goal: chart.goal,
        range_min: chart.range_min,
        range_max: chart.range_max,
        x_axis_type: is_time.then_some("date"),
        frequency: is_time.then_some(chart.frequency),
        start: range.start.filter(|_| is_time).map(iso_datetime),
        end: range.end.filter(|_| is_time).map(iso_datetime),
        force_crop: is_time.then_some(chart.force_crop()),
        series,
    }
}

/// Payload for one series; `None` when it has no points.
pub fn series_payload(series: &DataSeries, computed: &ComputedSeries, options: PayloadOptions) -> Option<SeriesPayload> {
    if computed.points.is_empty() {
        return None;
    }
    Some(SeriesPayload {
        title: series.title.clone(),
        description: series.description.clone(),
        display_format: display_format(series.display_precision),
        data: computed.points.iter().map(|p| (key_text(&p.key), point_payload(p, options))).collect(),
    })
}

pub fn point_payload(point: &DataPoint, options: PayloadOptions) -> PointPayload {
    PointPayload {
        value: (!point.value.is_nan()).then_some(point.value),
        title: title_case(&point.key.to_string()),
        note: point.note.clone().filter(|_| options.include_notes),
        uri: point.uri.clone().filter(|_| options.include_uris),
    }
}

/// printf-style format string for the client (`%.1f`).
pub fn display_format(precision: usize) -> String {
    format!("%.{precision}f")
}

/// Key as it appears in the payload.
pub fn key_text(key: &PointKey) -> String {
    match key {
        PointKey::Date(d) => iso_datetime(*d),
        PointKey::Name(n) => n.clone(),
    }
}

fn iso_datetime(d: NaiveDate) -> String {
    d.format("%Y-%m-%dT00:00:00").to_string()
}

/// Upper-case the first letter of each word, lower-case the rest.
///
/// A "word" starts after any non-alphabetic character, so `"o'neil-smith"`
/// becomes `"O'Neil-Smith"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
