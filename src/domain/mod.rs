//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - point keys and data points (`PointKey`, `DataPoint`, `DistributionEntry`)
//! - the summarization policy (`Strategy`)
//! - run configuration (`SeriesConfig`, `ChartConfig`, `DateRange`)

pub mod types;

pub use types::*;
