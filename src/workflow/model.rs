// src/workflow/model.rs

//! Pipeline model: steps, workflow definitions, and execution results.
//!
//! These are plain value objects. The definition is immutable once
//! constructed (by the loader or directly by a caller) and is never
//! mutated by the executor; adjacency is derived on demand from each
//! step's `depends_on` list, so the whole model stays serializable and
//! free of reference cycles.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical step name type used throughout the crate.
pub type StepName = String;

/// Classification of a workflow step.
///
/// Advisory only: `Parallel` is stamped on by group analysis
/// (`mark_parallel_steps`), never consulted for scheduling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Agent,
    Parallel,
    Conditional,
}

impl Default for StepKind {
    fn default() -> Self {
        StepKind::Agent
    }
}

/// Coordination pattern for multi-agent workflows.
///
/// - `Centralized`: a single orchestrator runs every step in definition
///   order, one at a time (default).
/// - `Hierarchical`: coordinator steps aggregate named subordinate steps,
///   which must complete first.
/// - `Mesh`: peers run in dependency order with maximum parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationMode {
    Centralized,
    Hierarchical,
    Mesh,
}

impl Default for CoordinationMode {
    fn default() -> Self {
        CoordinationMode::Centralized
    }
}

impl FromStr for CoordinationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "centralized" => Ok(CoordinationMode::Centralized),
            "hierarchical" => Ok(CoordinationMode::Hierarchical),
            "mesh" => Ok(CoordinationMode::Mesh),
            other => Err(format!(
                "invalid coordination_mode: {other} (expected \"centralized\", \"hierarchical\" or \"mesh\")"
            )),
        }
    }
}

/// Execution status of a workflow or a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// Single step in a workflow pipeline.
///
/// Each step names an agent capability, lists the steps whose outputs it
/// consumes, and carries a maximum retry count. `priority` only orders
/// concurrent submission when a parallel group is wider than its worker
/// pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: StepName,
    pub agent: String,
    #[serde(default)]
    pub kind: StepKind,
    /// Names of steps whose outputs feed this step, in declared order.
    #[serde(default)]
    pub depends_on: Vec<StepName>,
    #[serde(default)]
    pub prompt_template: String,
    #[serde(default)]
    pub max_retries: u32,
    /// Optional guard expression (`has:<step>` / `empty:<step>`); empty
    /// means the step always runs.
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub is_coordinator: bool,
    /// Steps this one aggregates; meaningful only when `is_coordinator`.
    #[serde(default)]
    pub subordinates: Vec<StepName>,
    #[serde(default)]
    pub priority: i64,
}

/// Complete workflow pipeline definition.
///
/// A workflow has a name, ordered steps, and optional configuration for
/// refinement loops (`max_iterations`) and the coordination mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub coordination_mode: CoordinationMode,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

fn default_max_iterations() -> u32 {
    1
}

impl WorkflowDefinition {
    /// Ordered list of step names.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Find a step by name.
    pub fn get_step(&self, name: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// Output from executing a single workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: StepName,
    pub status: WorkflowStatus,
    /// Step output; empty on failure or skip.
    pub output: String,
    /// Error message; empty unless the step failed.
    pub error: String,
    /// 1-based refinement iteration this result belongs to.
    pub iteration: u32,
}

impl StepResult {
    pub fn completed(name: &str, output: String, iteration: u32) -> Self {
        Self {
            step_name: name.to_string(),
            status: WorkflowStatus::Completed,
            output,
            error: String::new(),
            iteration,
        }
    }

    pub fn failed(name: &str, error: String, iteration: u32) -> Self {
        Self {
            step_name: name.to_string(),
            status: WorkflowStatus::Failed,
            output: String::new(),
            error,
            iteration,
        }
    }

    pub fn skipped(name: &str, iteration: u32) -> Self {
        Self {
            step_name: name.to_string(),
            status: WorkflowStatus::Skipped,
            output: String::new(),
            error: String::new(),
            iteration,
        }
    }

    /// True when the step completed without error.
    pub fn succeeded(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

/// Aggregated result from a complete workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_name: String,
    pub status: WorkflowStatus,
    /// Per-step results across all attempted iterations, in execution order.
    pub step_results: Vec<StepResult>,
    /// Number of refinement passes fully attempted.
    pub iterations_completed: u32,
}

impl WorkflowResult {
    /// True when the workflow completed without error.
    pub fn succeeded(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }

    /// Find the result for a step by name (first match in execution order).
    pub fn get_step_result(&self, name: &str) -> Option<&StepResult> {
        self.step_results.iter().find(|r| r.step_name == name)
    }

    /// Output of the last completed step, scanning from the end.
    pub fn final_output(&self) -> &str {
        self.step_results
            .iter()
            .rev()
            .find(|r| r.succeeded())
            .map(|r| r.output.as_str())
            .unwrap_or("")
    }
}
