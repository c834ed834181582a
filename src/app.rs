//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` defaults and sets up logging
//! - parses CLI arguments
//! - runs the series/chart pipeline
//! - prints tables or JSON and writes optional exports

use clap::Parser;

use crate::cli::{ChartArgs, Command, ComputeArgs, PipelineArgs};
use crate::domain::{ChartConfig, DateRange, OutputFormat, SeriesConfig};
use crate::error::AppError;
use crate::report::{PayloadOptions, SeriesPayload, display_format, series_payload};

pub mod pipeline;

/// Entry point for the `series` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    // `series data.csv ...` is shorthand for `series compute --input data.csv ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Compute(args) => handle_compute(args),
        Command::Chart(args) => handle_chart(args),
        Command::Strategies => handle_strategies(),
    }
}

/// `RUST_LOG` wins; otherwise only warnings reach stderr.
fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn handle_compute(args: ComputeArgs) -> Result<(), AppError> {
    let config = series_config_from_args(&args)?;
    let run = pipeline::run_series(&config)?;
    let series = &run.series;
    let computed = &run.computed;

    let payload = series_payload(series, computed, PayloadOptions::default()).unwrap_or_else(|| SeriesPayload {
        title: series.title.clone(),
        description: series.description.clone(),
        display_format: display_format(series.display_precision),
        data: Vec::new(),
    });

    match config.format {
        OutputFormat::Table => {
            println!(
                "{}",
                crate::report::format_series_table(&series.title, series.strategy(), computed, config.precision)
            );
        }
        OutputFormat::Json => {
            println!("{}", crate::io::payload::to_json_string(&payload)?);
        }
        OutputFormat::Csv => {
            crate::io::export::write_points_csv(std::io::stdout().lock(), &computed.points, config.precision)?;
        }
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_points_csv_file(path, &computed.points, config.precision)?;
        log::info!("wrote {} point(s) to {}", computed.points.len(), path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::payload::write_json(path, &payload)?;
        log::info!("wrote series payload to {}", path.display());
    }

    Ok(())
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let config = chart_config_from_args(&args)?;
    let run = pipeline::run_chart(&config)?;

    match &config.output {
        Some(path) => {
            crate::io::payload::write_json(path, &run.payload)?;
            log::info!(
                "wrote chart '{}' ({} series) to {}",
                run.chart.title,
                run.payload.series.len(),
                path.display()
            );
        }
        None => println!("{}", crate::io::payload::to_json_string(&run.payload)?),
    }

    Ok(())
}

fn handle_strategies() -> Result<(), AppError> {
    print!("{}", crate::report::format_strategies());
    Ok(())
}

fn date_range_from_args(args: &PipelineArgs) -> Result<DateRange, AppError> {
    DateRange::new(args.start, args.end)
}

pub fn series_config_from_args(args: &ComputeArgs) -> Result<SeriesConfig, AppError> {
    let p = &args.pipeline;
    Ok(SeriesConfig {
        input: args.input.clone(),
        title: args.title.clone(),
        source_format: p.source,
        key_kind: p.key,
        strategy: p.strategy,
        range: date_range_from_args(p)?,
        crop: p.crop,
        precision: p.precision,
        format: args.format,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}

pub fn chart_config_from_args(args: &ChartArgs) -> Result<ChartConfig, AppError> {
    let p = &args.pipeline;
    Ok(ChartConfig {
        title: args.title.clone(),
        description: args.description.clone(),
        units: args.units.clone(),
        goal: args.goal,
        range_min: args.range_min,
        range_max: args.range_max,
        inputs: args.series.clone(),
        series_titles: args.series_titles.clone(),
        source_format: p.source,
        key_kind: p.key,
        strategy: p.strategy,
        range: date_range_from_args(p)?,
        crop: p.crop,
        frequency: args.frequency,
        precision: p.precision,
        include_notes: !args.no_notes,
        output: args.output.clone(),
    })
}

/// Rewrite argv so a bare file argument means `compute`.
///
/// Rules:
/// - `series`                      -> unchanged (clap prints usage)
/// - `series --help/--version/-h`  -> unchanged
/// - `series <subcommand> ...`     -> unchanged
/// - `series FILE ...`             -> `series compute --input FILE ...`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    if arg1.starts_with('-') || matches!(arg1.as_str(), "help" | "compute" | "chart" | "strategies") {
        return argv;
    }

    argv.splice(1..1, ["compute".to_string(), "--input".to_string()]);
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{KeyKind, Strategy};
    use chrono::NaiveDate;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_file_becomes_compute() {
        assert_eq!(
            rewrite_args(argv(&["series", "data.csv", "-s", "SUM"])),
            argv(&["series", "compute", "--input", "data.csv", "-s", "SUM"])
        );
    }

    #[test]
    fn subcommands_and_flags_are_untouched() {
        for case in [
            vec!["series"],
            vec!["series", "--help"],
            vec!["series", "-V"],
            vec!["series", "strategies"],
            vec!["series", "chart", "--title", "T"],
        ] {
            assert_eq!(rewrite_args(argv(&case)), argv(&case));
        }
    }

    #[test]
    fn compute_args_map_to_config() {
        let cli = Cli::try_parse_from(rewrite_args(argv(&[
            "series",
            "visits.csv",
            "--key",
            "name",
            "--strategy",
            "median",
            "--precision",
            "2",
            "--format",
            "json",
        ])))
        .unwrap();
        let Command::Compute(args) = cli.command else {
            panic!("expected compute");
        };
        let config = series_config_from_args(&args).unwrap();
        assert_eq!(config.key_kind, KeyKind::Name);
        assert_eq!(config.strategy, Strategy::Median);
        assert_eq!(config.precision, 2);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.range.is_unbounded());
    }

    #[test]
    fn inverted_window_is_config_error() {
        let cli = Cli::try_parse_from([
            "series", "chart", "--title", "T", "--series", "a.csv", "--start", "2020-06-01", "--end", "2020-01-01",
        ])
        .unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart");
        };
        let err = chart_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn chart_args_map_to_config() {
        let cli = Cli::try_parse_from([
            "series",
            "chart",
            "--title",
            "Visits",
            "--series",
            "a.csv",
            "--series-title",
            "Clinic A",
            "--start",
            "01/01/2020",
            "--no-notes",
            "--goal",
            "90",
        ])
        .unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart");
        };
        let config = chart_config_from_args(&args).unwrap();
        assert_eq!(config.series_titles, vec!["Clinic A".to_string()]);
        assert_eq!(config.range.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(!config.include_notes);
        assert_eq!(config.goal, Some(90.0));
    }
}
