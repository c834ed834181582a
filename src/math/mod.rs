//! Small numeric helpers.
//!
//! - pure reductions used by the summarizer (`aggregate`)

pub mod aggregate;

pub use aggregate::*;
