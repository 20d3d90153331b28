// src/dag/mod.rs

//! Dependency-graph analysis.
//!
//! - [`groups`] assigns each step a dependency level and buckets steps
//!   into parallel groups, failing loud on cycles.

pub mod groups;

pub use groups::{can_parallelize, identify_parallel_groups, mark_parallel_steps, ParallelGroup};
