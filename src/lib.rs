//! `chart-series` library crate.
//!
//! Resolves data series whose points may share a key (a date or a name)
//! into one point per key, and renders the result as chart JSON.
//!
//! The binary (`series`) is a thin wrapper around this library so the core
//! logic is testable without spawning processes.

pub mod app;
pub mod chart;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod series;
