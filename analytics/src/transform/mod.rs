//! Transformation module.
//!
//! - Grouper: key → accumulator passes in first-seen order
//! - Derive: summaries, display columns, cleaning and export rows
//! - Pipeline: the `analyze` stage

pub mod derive;
pub mod grouper;
pub mod pipeline;

pub use grouper::{group_by, Accumulator, OrderedGroups};
pub use pipeline::run_analysis;
