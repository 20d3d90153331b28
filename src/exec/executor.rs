// src/exec/executor.rs

//! Sequential workflow executor.
//!
//! The executor walks steps in definition order across one or more
//! refinement iterations. Each step receives the combined output of its
//! declared dependencies; a step without explicit dependencies chains
//! from the immediately preceding step, and the first step of a
//! refinement pass chains from the previous pass's final step.
//!
//! Per iteration, per step:
//! 1. a prior failure in the same iteration marks the step Skipped;
//! 2. a false condition marks it Skipped;
//! 3. otherwise the step runs with bounded immediate retry;
//! 4. a Failed result skips the rest of the iteration and halts the
//!    workflow with a Failed overall status.
//!
//! The executor holds no state across `execute` calls; outputs accumulate
//! in a local map for the duration of one invocation only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::exec::runner::StepRunner;
use crate::workflow::model::{
    StepName, StepResult, WorkflowDefinition, WorkflowResult, WorkflowStatus, WorkflowStep,
};

/// Execute workflow definitions with output chaining.
pub struct WorkflowExecutor {
    runner: Arc<dyn StepRunner>,
}

impl WorkflowExecutor {
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self { runner }
    }

    /// Run a workflow definition to completion.
    ///
    /// Validates the workflow first; a non-empty finding list short-circuits
    /// to a Failed result without invoking the runner. Never returns an
    /// error: runtime step failures are recorded as data in the per-step
    /// results.
    pub async fn execute(&self, workflow: &WorkflowDefinition) -> WorkflowResult {
        let errors = workflow.validate();
        if !errors.is_empty() {
            error!(workflow = %workflow.name, ?errors, "workflow validation failed");
            return WorkflowResult {
                workflow_name: workflow.name.clone(),
                status: WorkflowStatus::Failed,
                step_results: Vec::new(),
                iterations_completed: 0,
            };
        }

        let mut result = WorkflowResult {
            workflow_name: workflow.name.clone(),
            status: WorkflowStatus::Running,
            step_results: Vec::new(),
            iterations_completed: 0,
        };

        // Outputs persist across iterations for refinement loops.
        let mut step_outputs: HashMap<StepName, String> = HashMap::new();

        for iteration in 1..=workflow.max_iterations {
            info!(
                workflow = %workflow.name,
                iteration,
                max_iterations = workflow.max_iterations,
                "starting workflow iteration"
            );
            result.iterations_completed = iteration;
            let mut failed = false;

            for (idx, step) in workflow.steps.iter().enumerate() {
                if failed {
                    result.step_results.push(StepResult::skipped(&step.name, iteration));
                    continue;
                }

                if !step.condition.is_empty()
                    && !evaluate_condition(&step.condition, &step_outputs)
                {
                    debug!(
                        step = %step.name,
                        condition = %step.condition,
                        "condition not met; skipping step"
                    );
                    result.step_results.push(StepResult::skipped(&step.name, iteration));
                    continue;
                }

                let combined_input = gather_inputs(step, idx, &step_outputs, workflow);
                let step_result = self
                    .run_step_with_retry(step, &combined_input, iteration)
                    .await;

                if step_result.succeeded() {
                    step_outputs.insert(step.name.clone(), step_result.output.clone());
                } else {
                    failed = true;
                }
                result.step_results.push(step_result);
            }

            if failed {
                result.status = WorkflowStatus::Failed;
                return result;
            }
        }

        result.status = WorkflowStatus::Completed;
        result
    }

    /// Execute a step with bounded immediate retry.
    ///
    /// Up to `max_retries + 1` attempts; no backoff between attempts. The
    /// first success wins; once attempts are exhausted the result carries
    /// the last error message.
    async fn run_step_with_retry(
        &self,
        step: &WorkflowStep,
        combined_input: &str,
        iteration: u32,
    ) -> StepResult {
        let mut last_error = String::new();

        for attempt in 1..=step.max_retries + 1 {
            match self.runner.run_step(step, combined_input, iteration).await {
                Ok(output) => {
                    debug!(step = %step.name, iteration, attempt, "step completed");
                    return StepResult::completed(&step.name, output, iteration);
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        step = %step.name,
                        iteration,
                        attempt,
                        error = %last_error,
                        "step attempt failed"
                    );
                }
            }
        }

        StepResult::failed(&step.name, last_error, iteration)
    }
}

/// Combine outputs from upstream steps into a single input string.
///
/// - Explicit dependencies: their outputs in declared order, joined with a
///   separator; a dependency with no recorded output contributes nothing.
/// - No dependencies, not the first step: the previous step's output.
/// - First step of an iteration: the last step's output from the previous
///   iteration (empty on the very first pass).
fn gather_inputs(
    step: &WorkflowStep,
    idx: usize,
    step_outputs: &HashMap<StepName, String>,
    workflow: &WorkflowDefinition,
) -> String {
    if !step.depends_on.is_empty() {
        let parts: Vec<&str> = step
            .depends_on
            .iter()
            .filter_map(|d| step_outputs.get(d).map(String::as_str))
            .collect();
        return parts.join("\n---\n");
    }

    if idx > 0 {
        let prev_name = &workflow.steps[idx - 1].name;
        return step_outputs.get(prev_name).cloned().unwrap_or_default();
    }

    match workflow.steps.last() {
        Some(last) => step_outputs.get(&last.name).cloned().unwrap_or_default(),
        None => String::new(),
    }
}

/// Evaluate a simple condition expression against recorded outputs.
///
/// - `has:<step>` is true when the step produced non-empty output.
/// - `empty:<step>` is true when it produced no output or never ran.
/// - Anything else evaluates to true.
fn evaluate_condition(condition: &str, step_outputs: &HashMap<StepName, String>) -> bool {
    if let Some(name) = condition.strip_prefix("has:") {
        return step_outputs
            .get(name.trim())
            .is_some_and(|o| !o.trim().is_empty());
    }
    if let Some(name) = condition.strip_prefix("empty:") {
        return !step_outputs
            .get(name.trim())
            .is_some_and(|o| !o.trim().is_empty());
    }
    true
}
