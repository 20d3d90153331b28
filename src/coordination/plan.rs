// src/coordination/plan.rs

//! Execution planning on top of the coordination strategies.
//!
//! - [`find_ready_steps`] is the mode-aware ready-set query used when
//!   dispatching incrementally.
//! - [`build_execution_plan`] precomputes the full phased plan (which
//!   steps can run together, phase by phase).
//! - [`aggregate_subordinate_outputs`] merges subordinate outputs for a
//!   hierarchical coordinator.

use std::collections::{HashMap, HashSet};

use crate::coordination::strategy_for;
use crate::errors::{AgentdagError, Result};
use crate::workflow::model::{CoordinationMode, StepName, WorkflowDefinition, WorkflowStep};

/// Find steps that are ready to execute under the workflow's mode.
///
/// Returns steps whose dependencies are satisfied and that are neither
/// completed nor running. Parallel-eligible steps are all returned
/// together; otherwise the first dependency-satisfied step is returned
/// alone (one-at-a-time dispatch).
pub fn find_ready_steps(
    workflow: &WorkflowDefinition,
    completed: &HashSet<StepName>,
    running: &HashSet<StepName>,
) -> Vec<WorkflowStep> {
    let strategy = strategy_for(workflow.coordination_mode);
    let mut ready: Vec<WorkflowStep> = Vec::new();

    for step in &workflow.steps {
        if completed.contains(&step.name) || running.contains(&step.name) {
            continue;
        }
        if strategy.can_execute_parallel(step, completed, workflow) {
            ready.push(step.clone());
        } else if ready.is_empty() {
            if step.depends_on.iter().all(|d| completed.contains(d)) {
                ready.push(step.clone());
                break;
            }
        }
    }

    ready
}

/// Combine outputs from subordinate steps for a coordinator.
///
/// The coordinator receives a merged view of all subordinate outputs,
/// separated by section headers; subordinates with no recorded output are
/// skipped.
pub fn aggregate_subordinate_outputs(
    coordinator: &WorkflowStep,
    step_outputs: &HashMap<StepName, String>,
) -> String {
    let parts: Vec<String> = coordinator
        .subordinates
        .iter()
        .filter_map(|sub| {
            step_outputs
                .get(sub)
                .map(|output| format!("## Output from {sub}\n\n{output}"))
        })
        .collect();

    parts.join("\n\n---\n\n")
}

/// Build a phased execution plan for a workflow.
///
/// Each phase lists step names that can execute together. Centralized
/// mode yields one singleton phase per step in declaration order. A step
/// that is ready but not parallel-eligible (e.g. a hierarchical
/// coordinator) gets a singleton phase of its own.
///
/// Errors with [`AgentdagError::DependencyCycle`] when no remaining step
/// can make progress; an arbitrary order would mask the cycle, so none is
/// invented.
pub fn build_execution_plan(workflow: &WorkflowDefinition) -> Result<Vec<Vec<StepName>>> {
    let strategy = strategy_for(workflow.coordination_mode);
    let ordered = strategy.order_steps(workflow);

    if workflow.coordination_mode == CoordinationMode::Centralized {
        return Ok(ordered.iter().map(|s| vec![s.name.clone()]).collect());
    }

    let mut phases: Vec<Vec<StepName>> = Vec::new();
    let mut completed: HashSet<StepName> = HashSet::new();
    let mut remaining: Vec<&WorkflowStep> = workflow.steps.iter().collect();

    while !remaining.is_empty() {
        let mut phase: Vec<StepName> = Vec::new();

        for step in &remaining {
            if step.depends_on.iter().all(|d| completed.contains(d))
                && strategy.can_execute_parallel(step, &completed, workflow)
            {
                phase.push(step.name.clone());
            }
        }

        if phase.is_empty() {
            // Serial-only fallback: a ready step that must run alone.
            let next = remaining
                .iter()
                .find(|s| s.depends_on.iter().all(|d| completed.contains(d)));
            match next {
                Some(step) => phase.push(step.name.clone()),
                None => {
                    let stuck: Vec<&str> =
                        remaining.iter().map(|s| s.name.as_str()).collect();
                    return Err(AgentdagError::DependencyCycle(format!(
                        "execution plan stalled; unresolvable steps: {}",
                        stuck.join(", ")
                    )));
                }
            }
        }

        remaining.retain(|s| !phase.contains(&s.name));
        completed.extend(phase.iter().cloned());
        phases.push(phase);
    }

    Ok(phases)
}
