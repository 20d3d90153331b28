// src/workflow/mod.rs

//! Workflow model and structural validation.
//!
//! - [`model`] holds the pipeline description: steps, dependency lists,
//!   coordination mode, and the per-step / per-workflow result types.
//! - [`validate`] implements the accumulate-and-report structural checks
//!   that run before any execution.

pub mod model;
pub mod validate;

pub use model::{
    CoordinationMode, StepKind, StepName, StepResult, WorkflowDefinition, WorkflowResult,
    WorkflowStatus, WorkflowStep,
};
