//! Series assembly.
//!
//! A series is produced by one pipeline:
//! source → range filter (date keys only) → summarizer → point list
//!
//! The result is a pure function of (raw input, filter bounds, strategy), so
//! each `DataSeries` memoizes it under a hash of those three inputs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::domain::{DataPoint, DateRange, KeyKind, Strategy};
use crate::error::AppError;
use crate::io::ingest::RowError;

pub mod cache;
pub mod filter;
pub mod source;
pub mod summarize;

pub use cache::SeriesCache;
pub use filter::{Filtered, apply_range};
pub use source::{PointSource, RecordSource, SourcePoints, TextSource, source_from_path};
pub use summarize::{NO_USABLE_VALUE, Resolution, resolution, summarize};

/// Output of the series pipeline.
#[derive(Debug, Clone, Default)]
pub struct ComputedSeries {
    /// One point per key, in first-seen key order.
    pub points: Vec<DataPoint>,
    /// Points removed by the range filter.
    pub excluded: Vec<DataPoint>,
    /// Source rows that could not be turned into points.
    pub skipped: Vec<RowError>,
    pub rows_read: usize,
}

/// Resolve raw points into the final series.
///
/// Fails only on programming/configuration errors: a point whose key is not
/// of `key_kind`, or date bounds on a name-keyed series.
pub fn compute_series(
    raw_points: Vec<DataPoint>,
    key_kind: KeyKind,
    strategy: Strategy,
    range: Option<&DateRange>,
) -> Result<ComputedSeries, AppError> {
    ensure_keys_match(&raw_points, key_kind)?;
    let rows_read = raw_points.len();
    let Filtered { kept, excluded } = apply_range(raw_points, key_kind, range)?;
    let points = summarize(kept, strategy);
    Ok(ComputedSeries {
        points,
        excluded,
        skipped: Vec::new(),
        rows_read,
    })
}

fn ensure_keys_match(points: &[DataPoint], key_kind: KeyKind) -> Result<(), AppError> {
    match points.iter().find(|p| p.key.kind() != key_kind) {
        Some(p) => Err(AppError::config(format!(
            "Series is keyed by {} but contains {} key '{}'.",
            key_kind.display_name(),
            p.key.kind().display_name(),
            p.key
        ))),
        None => Ok(()),
    }
}

/// A named series owning its source, strategy and memoized result.
#[derive(Debug)]
pub struct DataSeries {
    pub title: String,
    pub description: Option<String>,
    /// Digits after the decimal point when displaying values.
    pub display_precision: usize,
    key_kind: KeyKind,
    strategy: Strategy,
    source: Box<dyn PointSource>,
    cache: SeriesCache,
}

impl DataSeries {
    pub fn new(
        title: impl Into<String>,
        key_kind: KeyKind,
        strategy: Strategy,
        source: Box<dyn PointSource>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            display_precision: 1,
            key_kind,
            strategy,
            source,
            cache: SeriesCache::new(),
        }
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Replace the raw input; the memoized result is dropped.
    pub fn set_source(&mut self, source: Box<dyn PointSource>) {
        self.source = source;
        self.cache.invalidate();
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
        self.cache.invalidate();
    }

    /// Run (or reuse) the pipeline for the given filter bounds.
    pub fn compute(&self, range: Option<&DateRange>) -> Result<Arc<ComputedSeries>, AppError> {
        let hash = self.input_hash(range);
        if let Some(hit) = self.cache.get(hash) {
            log::debug!("series '{}': cache hit", self.title);
            return Ok(hit);
        }

        let loaded = self.source.load(self.key_kind);
        let computed = compute_series(loaded.points, self.key_kind, self.strategy, range)?;
        let computed = Arc::new(ComputedSeries {
            skipped: loaded.row_errors,
            rows_read: loaded.rows_read,
            ..computed
        });
        log::info!(
            "series '{}': {} row(s) read, {} skipped, {} excluded, {} point(s) after {}",
            self.title,
            computed.rows_read,
            computed.skipped.len(),
            computed.excluded.len(),
            computed.points.len(),
            self.strategy
        );

        self.cache.store(hash, Arc::clone(&computed));
        Ok(computed)
    }

    fn input_hash(&self, range: Option<&DateRange>) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.source.content_hash().hash(&mut hasher);
        self.key_kind.hash(&mut hasher);
        self.strategy.hash(&mut hasher);
        range.hash(&mut hasher);
        hasher.finish()
    }
}
