// src/coordination/mod.rs

//! Coordination strategies for multi-agent workflow execution.
//!
//! Each [`CoordinationMode`] maps to one [`CoordinationStrategy`]
//! implementation answering two questions: in what order should steps be
//! considered, and may a given step run in parallel with completed work.
//! The executor talks to the trait, never to a concrete mode.
//!
//! - `Centralized`: definition order, no concurrency.
//! - `Hierarchical`: subordinates before their coordinators; only
//!   non-coordinator steps are parallel-eligible.
//! - `Mesh`: topological order; every ready step is parallel-eligible.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::workflow::model::{CoordinationMode, StepName, WorkflowDefinition, WorkflowStep};

pub mod plan;

pub use plan::{aggregate_subordinate_outputs, build_execution_plan, find_ready_steps};

/// Base interface for coordination strategies.
pub trait CoordinationStrategy: Send + Sync {
    /// Determine execution order for steps based on the coordination mode.
    fn order_steps(&self, workflow: &WorkflowDefinition) -> Vec<WorkflowStep>;

    /// Whether `step` may execute in parallel given the completed set.
    fn can_execute_parallel(
        &self,
        step: &WorkflowStep,
        completed: &HashSet<StepName>,
        workflow: &WorkflowDefinition,
    ) -> bool;
}

/// Look up the strategy for a coordination mode.
pub fn strategy_for(mode: CoordinationMode) -> Box<dyn CoordinationStrategy> {
    match mode {
        CoordinationMode::Centralized => Box::new(CentralizedStrategy),
        CoordinationMode::Hierarchical => Box::new(HierarchicalStrategy),
        CoordinationMode::Mesh => Box::new(MeshStrategy),
    }
}

/// Single orchestrator manages all steps sequentially.
///
/// Steps execute in definition order; each waits for the previous one.
pub struct CentralizedStrategy;

impl CoordinationStrategy for CentralizedStrategy {
    fn order_steps(&self, workflow: &WorkflowDefinition) -> Vec<WorkflowStep> {
        workflow.steps.clone()
    }

    fn can_execute_parallel(
        &self,
        _step: &WorkflowStep,
        _completed: &HashSet<StepName>,
        _workflow: &WorkflowDefinition,
    ) -> bool {
        // Centralized mode never runs two steps concurrently.
        false
    }
}

/// Tree structure with nested coordinators.
///
/// A coordinator executes after all its transitive subordinates complete;
/// subordinates may run in parallel within their group.
pub struct HierarchicalStrategy;

impl CoordinationStrategy for HierarchicalStrategy {
    fn order_steps(&self, workflow: &WorkflowDefinition) -> Vec<WorkflowStep> {
        let by_name: HashMap<&str, &WorkflowStep> =
            workflow.steps.iter().map(|s| (s.name.as_str(), s)).collect();
        let mut visited: HashSet<StepName> = HashSet::new();
        let mut ordered: Vec<WorkflowStep> = Vec::new();

        for step in &workflow.steps {
            visit(&step.name, &by_name, &mut visited, &mut ordered);
        }

        ordered
    }

    fn can_execute_parallel(
        &self,
        step: &WorkflowStep,
        completed: &HashSet<StepName>,
        _workflow: &WorkflowDefinition,
    ) -> bool {
        if step.is_coordinator {
            return false;
        }
        step.depends_on.iter().all(|d| completed.contains(d))
    }
}

/// Post-order traversal: every subordinate precedes its coordinator.
///
/// Names not present in the workflow are skipped; each step is visited at
/// most once even when referenced by multiple coordinators (marked before
/// descending, so a malformed subordinate cycle cannot recurse forever).
fn visit(
    name: &str,
    by_name: &HashMap<&str, &WorkflowStep>,
    visited: &mut HashSet<StepName>,
    ordered: &mut Vec<WorkflowStep>,
) {
    if visited.contains(name) {
        return;
    }
    let Some(step) = by_name.get(name) else {
        return;
    };
    visited.insert(name.to_string());

    for sub in &step.subordinates {
        visit(sub, by_name, visited, ordered);
    }
    ordered.push((*step).clone());
}

/// Peer-to-peer collaboration.
///
/// Steps execute in any order once their dependencies are met; no
/// hierarchy, maximum parallelism.
pub struct MeshStrategy;

impl CoordinationStrategy for MeshStrategy {
    /// Kahn topological sort over `depends_on` edges, breaking ties in
    /// declaration order.
    fn order_steps(&self, workflow: &WorkflowDefinition) -> Vec<WorkflowStep> {
        let mut in_degree: HashMap<&str, usize> = workflow
            .steps
            .iter()
            .map(|s| {
                let distinct: HashSet<&str> =
                    s.depends_on.iter().map(|d| d.as_str()).collect();
                (s.name.as_str(), distinct.len())
            })
            .collect();

        let mut queue: VecDeque<&WorkflowStep> = workflow
            .steps
            .iter()
            .filter(|s| in_degree.get(s.name.as_str()) == Some(&0))
            .collect();

        let mut ordered: Vec<WorkflowStep> = Vec::new();

        while let Some(step) = queue.pop_front() {
            ordered.push(step.clone());

            for other in &workflow.steps {
                if other.depends_on.iter().any(|d| d == &step.name) {
                    if let Some(deg) = in_degree.get_mut(other.name.as_str()) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            queue.push_back(other);
                        }
                    }
                }
            }
        }

        if ordered.len() < workflow.steps.len() {
            // Cycles are reported as hard errors by group analysis and
            // plan building; here the unorderable remainder is dropped.
            warn!(
                workflow = %workflow.name,
                unordered = workflow.steps.len() - ordered.len(),
                "steps unreachable in topological order; dependency graph has a cycle"
            );
        }

        ordered
    }

    fn can_execute_parallel(
        &self,
        step: &WorkflowStep,
        completed: &HashSet<StepName>,
        _workflow: &WorkflowDefinition,
    ) -> bool {
        step.depends_on.iter().all(|d| completed.contains(d))
    }
}
