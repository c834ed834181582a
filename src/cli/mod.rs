//! Command-line parsing for the `series` tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline code. Defaults for the most common knobs can come from the
//! environment (or a `.env` file): `SERIES_STRATEGY`, `SERIES_KEY`,
//! `SERIES_PRECISION`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Frequency, KeyKind, OutputFormat, SourceFormat, Strategy};
use crate::io::ingest::parse_date;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "series", version, about = "Resolve duplicate-keyed chart data series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve one series file and print it (table, JSON or CSV).
    Compute(ComputeArgs),
    /// Build chart JSON from one or more series files.
    Chart(ChartArgs),
    /// List the available summarization strategies.
    Strategies,
}

/// Options shared by every command that runs the series pipeline.
#[derive(Debug, Args, Clone)]
pub struct PipelineArgs {
    /// Key type of the points.
    #[arg(short = 'k', long, env = "SERIES_KEY", value_enum, default_value_t = KeyKind::Date)]
    pub key: KeyKind,

    /// How to resolve several values for the same key (e.g. AVG, WEIGHTED_MEAN, IGNORE).
    #[arg(short = 's', long, env = "SERIES_STRATEGY", default_value = "AVG")]
    pub strategy: Strategy,

    /// How to read input files.
    #[arg(long, value_enum, default_value_t = SourceFormat::Auto)]
    pub source: SourceFormat,

    /// Start of the date window (MM/DD/YYYY or YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// End of the date window (inclusive).
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Drop points outside the date window before summarizing.
    #[arg(long)]
    pub crop: bool,

    /// Digits after the decimal point in displayed values.
    #[arg(long, env = "SERIES_PRECISION", default_value_t = 1)]
    pub precision: usize,
}

/// Options for `series compute`.
#[derive(Debug, Args, Clone)]
pub struct ComputeArgs {
    /// Input file: delimited text (`key,value[,note[,uri]]`) or JSON records.
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,

    /// Series title (defaults to the file name).
    #[arg(long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Terminal output format.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also write the resolved points to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Also write the series JSON payload.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `series chart`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Chart title.
    #[arg(long)]
    pub title: String,

    /// Chart description.
    #[arg(long)]
    pub description: Option<String>,

    /// Units of measure shown with the y-axis.
    #[arg(long)]
    pub units: Option<String>,

    /// Common goal value.
    #[arg(long)]
    pub goal: Option<f64>,

    /// Anticipated minimum value (y-axis).
    #[arg(long)]
    pub range_min: Option<f64>,

    /// Anticipated maximum value (y-axis).
    #[arg(long)]
    pub range_max: Option<f64>,

    /// Series input files, in display order.
    #[arg(long = "series", value_name = "FILE", required = true, num_args = 1..)]
    pub series: Vec<PathBuf>,

    /// Series titles, matched to `--series` by position.
    #[arg(long = "series-title", value_name = "TITLE")]
    pub series_titles: Vec<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Display frequency for time-series charts.
    #[arg(long, value_enum, default_value_t = Frequency::Monthly)]
    pub frequency: Frequency,

    /// Leave point notes out of the payload.
    #[arg(long)]
    pub no_notes: bool,

    /// Write the payload here instead of stdout.
    #[arg(short = 'o', long, value_name = "JSON")]
    pub output: Option<PathBuf>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s.trim())
}
