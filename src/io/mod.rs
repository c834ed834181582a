//! Input/output helpers.
//!
//! - delimited text ingest (`ingest`)
//! - raw JSON records (`records`)
//! - CSV export of resolved points (`export`)
//! - JSON payload writing (`payload`)

pub mod export;
pub mod ingest;
pub mod payload;
pub mod records;

pub use export::*;
pub use ingest::*;
pub use payload::*;
pub use records::*;
