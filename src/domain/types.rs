//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by any point source (CSV text, raw JSON records)
//! - resolved by the summarizer without copying metadata around
//! - exported to chart JSON/CSV

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which kind of key identifies points in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Calendar dates (time-series charts).
    Date,
    /// Category names (named-series charts).
    Name,
}

impl KeyKind {
    pub fn display_name(self) -> &'static str {
        match self {
            KeyKind::Date => "date",
            KeyKind::Name => "name",
        }
    }
}

/// Identity of a point within its series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PointKey {
    Date(NaiveDate),
    Name(String),
}

impl PointKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            PointKey::Date(_) => KeyKind::Date,
            PointKey::Name(_) => KeyKind::Name,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            PointKey::Date(d) => Some(*d),
            PointKey::Name(_) => None,
        }
    }

    /// Collation used when listing identities across series.
    ///
    /// Names compare case-insensitively (ties broken by the raw text so the
    /// order stays total), dates chronologically. Dates sort before names,
    /// though a well-formed chart never mixes the two.
    pub fn collate(&self, other: &PointKey) -> Ordering {
        match (self, other) {
            (PointKey::Date(a), PointKey::Date(b)) => a.cmp(b),
            (PointKey::Name(a), PointKey::Name(b)) => a
                .to_uppercase()
                .cmp(&b.to_uppercase())
                .then_with(|| a.cmp(b)),
            (PointKey::Date(_), PointKey::Name(_)) => Ordering::Less,
            (PointKey::Name(_), PointKey::Date(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PointKey::Name(n) => write!(f, "{n}"),
        }
    }
}

/// One contributing input behind an aggregated point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
}

/// A single observation in a series.
///
/// Points are built once (by a source or by the summarizer) and then only
/// read; the `with_*` helpers consume `self` so a finished point is never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub key: PointKey,
    /// `NaN` marks a missing value; it is kept so renderers can draw a gap.
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
    /// Only set on points produced by aggregation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<DistributionEntry>>,
}

impl DataPoint {
    pub fn new(key: PointKey, value: f64) -> Self {
        Self {
            key,
            value,
            note: None,
            uri: None,
            sample_size: None,
            distribution: None,
        }
    }

    /// A NaN-valued placeholder carrying an explanatory note.
    pub fn missing(key: PointKey, note: impl Into<String>) -> Self {
        Self::new(key, f64::NAN).with_note(note)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_sample_size(mut self, sample_size: u64) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    pub fn with_distribution(mut self, distribution: Vec<DistributionEntry>) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }

    pub fn distribution_entry(&self) -> DistributionEntry {
        DistributionEntry {
            value: self.value,
            sample_size: self.sample_size,
        }
    }
}

/// Policy for collapsing several points that share a key into one.
///
/// Parsed through `FromStr` (also by clap), so every spelling accepted on the
/// command line is also accepted from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    Sum,
    Avg,
    Product,
    Min,
    Max,
    Median,
    Count,
    WeightedMean,
    First,
    Last,
    Ignore,
}

impl Strategy {
    pub const ALL: [Strategy; 11] = [
        Strategy::Sum,
        Strategy::Avg,
        Strategy::Product,
        Strategy::Min,
        Strategy::Max,
        Strategy::Median,
        Strategy::Count,
        Strategy::WeightedMean,
        Strategy::First,
        Strategy::Last,
        Strategy::Ignore,
    ];

    /// Canonical configuration name (e.g. `WEIGHTED_MEAN`).
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sum => "SUM",
            Strategy::Avg => "AVG",
            Strategy::Product => "PRODUCT",
            Strategy::Min => "MIN",
            Strategy::Max => "MAX",
            Strategy::Median => "MEDIAN",
            Strategy::Count => "COUNT",
            Strategy::WeightedMean => "WEIGHTED_MEAN",
            Strategy::First => "FIRST",
            Strategy::Last => "LAST",
            Strategy::Ignore => "IGNORE",
        }
    }

    /// Short label used in the notes of aggregated points.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Sum => "Sum",
            Strategy::Avg => "Average",
            Strategy::Product => "Product",
            Strategy::Min => "Minimum",
            Strategy::Max => "Maximum",
            Strategy::Median => "Median",
            Strategy::Count => "Count",
            Strategy::WeightedMean => "Weighted mean",
            Strategy::First => "First",
            Strategy::Last => "Last",
            Strategy::Ignore => "Ignore",
        }
    }

    /// Human-readable description for listings.
    pub fn description(self) -> &'static str {
        match self {
            Strategy::Sum => "Sum",
            Strategy::Avg => "Average",
            Strategy::Product => "Product",
            Strategy::Min => "Minimum",
            Strategy::Max => "Maximum",
            Strategy::Median => "Median",
            Strategy::Count => "Count of occurrences",
            Strategy::WeightedMean => "Weighted mean",
            Strategy::First => "Pick first found value",
            Strategy::Last => "Pick last found value",
            Strategy::Ignore => "Ignore more than one value, omit on encountered duplication",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    /// Accepts `WEIGHTED_MEAN`, `weighted_mean` and `weighted-mean` alike.
    ///
    /// Unknown names are a configuration error; there is no pass-through fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == normalized)
            .ok_or_else(|| {
                AppError::config(format!(
                    "Unknown summarization strategy '{s}'. Expected one of: {}.",
                    Strategy::ALL.map(Strategy::as_str).join(", ")
                ))
            })
    }
}

/// Display frequency of a time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Weekly,
    Yearly,
    Quarterly,
    Daily,
}

/// Inclusive date window used by the range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, AppError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::config(format!(
                    "Start date {s} cannot be after end date {e}."
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }
}

/// How to interpret an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// `.json` files are raw records, everything else is delimited text.
    Auto,
    /// `key,value[,note[,uri]]` lines.
    Text,
    /// JSON array of `{key, value, note?, uri?, sample_size?}` objects.
    Records,
}

/// Terminal output format for `series compute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// A single-series run as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    pub input: PathBuf,
    pub title: Option<String>,
    pub source_format: SourceFormat,
    pub key_kind: KeyKind,
    pub strategy: Strategy,
    pub range: DateRange,
    /// Apply `range` to the points (forced crop).
    pub crop: bool,
    /// Digits after the decimal point when displaying values.
    pub precision: usize,
    pub format: OutputFormat,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A multi-series chart run.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub title: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub goal: Option<f64>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub inputs: Vec<PathBuf>,
    /// Titles matched to `inputs` by position; missing ones fall back to the file stem.
    pub series_titles: Vec<String>,
    pub source_format: SourceFormat,
    pub key_kind: KeyKind,
    pub strategy: Strategy,
    pub range: DateRange,
    pub crop: bool,
    pub frequency: Frequency,
    pub precision: usize,
    pub include_notes: bool,
    pub output: Option<PathBuf>,
}
