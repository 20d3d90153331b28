// src/exec/runner.rs

//! Pluggable step runner abstraction.
//!
//! The executors talk to a `StepRunner` instead of a concrete agent
//! backend. Production implementations invoke an agent/capability and
//! return its textual output; tests substitute a fake that scripts
//! outputs and failures without any real agent.
//!
//! The core treats the runner as a black box: it produces text or fails.
//! An `Err` is the only failure signal; the executors convert it into a
//! Failed [`StepResult`](crate::workflow::StepResult) rather than
//! propagating it.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::workflow::model::WorkflowStep;

/// Trait abstracting how a single workflow step is executed.
pub trait StepRunner: Send + Sync {
    /// Run one step.
    ///
    /// - `combined_input` is the gathered output of upstream steps.
    /// - `iteration` is the 1-based refinement pass.
    fn run_step<'a>(
        &'a self,
        step: &'a WorkflowStep,
        combined_input: &'a str,
        iteration: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
