//! Charts: ordered collections of series sharing one key kind.
//!
//! Responsibilities:
//!
//! - hold chart-level metadata and the date window
//! - compute every series (independently, in parallel)
//! - list the sorted union of point identities across series

pub mod collection;

pub use collection::*;
