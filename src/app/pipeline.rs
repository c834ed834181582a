//! Shared pipeline logic behind the `compute` and `chart` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! open sources -> build series/chart -> compute -> payload
//!
//! The command handlers can then focus on presentation.

use std::path::Path;
use std::sync::Arc;

use crate::chart::Chart;
use crate::domain::{ChartConfig, DateRange, KeyKind, SeriesConfig};
use crate::error::AppError;
use crate::report::{ChartPayload, PayloadOptions, chart_payload};
use crate::series::{ComputedSeries, DataSeries, source_from_path};

/// Outputs of a single-series run.
#[derive(Debug)]
pub struct SeriesRun {
    pub series: DataSeries,
    pub computed: Arc<ComputedSeries>,
}

/// Outputs of a chart run.
#[derive(Debug)]
pub struct ChartRun {
    pub chart: Chart,
    pub computed: Vec<Arc<ComputedSeries>>,
    pub payload: ChartPayload,
}

/// Load, filter and summarize one series.
pub fn run_series(config: &SeriesConfig) -> Result<SeriesRun, AppError> {
    ensure_range_fits_key(config.key_kind, &config.range)?;

    let source = source_from_path(&config.input, config.source_format)?;
    let title = config.title.clone().unwrap_or_else(|| file_title(&config.input));
    let mut series = DataSeries::new(title, config.key_kind, config.strategy, source);
    series.display_precision = config.precision;

    let range = config.crop.then_some(&config.range);
    let computed = series.compute(range)?;

    if computed.rows_read == computed.skipped.len() {
        return Err(AppError::no_data(format!(
            "No valid rows in '{}' ({} read).",
            config.input.display(),
            computed.rows_read
        )));
    }

    Ok(SeriesRun { series, computed })
}

/// Build a chart from several series files and compute its payload.
pub fn run_chart(config: &ChartConfig) -> Result<ChartRun, AppError> {
    ensure_range_fits_key(config.key_kind, &config.range)?;

    let mut chart = Chart::new(config.title.clone(), config.key_kind).with_range(config.range, config.crop)?;
    chart.description = config.description.clone();
    chart.units = config.units.clone();
    chart.goal = config.goal;
    chart.range_min = config.range_min;
    chart.range_max = config.range_max;
    chart.frequency = config.frequency;

    for (idx, path) in config.inputs.iter().enumerate() {
        let source = source_from_path(path, config.source_format)?;
        let title = config
            .series_titles
            .get(idx)
            .cloned()
            .unwrap_or_else(|| file_title(path));
        let mut series = DataSeries::new(title, config.key_kind, config.strategy, source);
        series.display_precision = config.precision;
        chart.add_series(series)?;
    }

    let computed = chart.compute_all()?;
    let options = PayloadOptions {
        include_notes: config.include_notes,
        ..PayloadOptions::default()
    };
    let payload = chart_payload(&chart, &computed, options);

    if payload.series.is_empty() {
        return Err(AppError::no_data(format!(
            "Chart '{}' has no data in any of its {} series.",
            config.title,
            config.inputs.len()
        )));
    }

    Ok(ChartRun {
        chart,
        computed,
        payload,
    })
}

fn ensure_range_fits_key(key_kind: KeyKind, range: &DateRange) -> Result<(), AppError> {
    if key_kind == KeyKind::Name && !range.is_unbounded() {
        return Err(AppError::config("--start/--end only apply to date-keyed series."));
    }
    Ok(())
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
