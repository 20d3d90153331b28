// src/dag/groups.rs

//! Parallel group analysis.
//!
//! Steps are assigned an integer level: one plus the maximum level of
//! their dependencies (level 0 with none). Steps at the same level have no
//! dependency on each other, directly or transitively, and may execute
//! concurrently. Level assignment proceeds in rounds; a round that
//! assigns nothing while steps remain means the `depends_on` graph has a
//! cycle, and no safe default ordering exists, so the analyzer errors out
//! instead of guessing.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AgentdagError, Result};
use crate::workflow::model::{StepKind, StepName, WorkflowDefinition, WorkflowStep};

/// A set of steps that can execute concurrently.
///
/// Derived fresh from the dependency graph on each call; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGroup {
    /// Member step names, highest priority first (declaration order on ties).
    pub step_names: Vec<StepName>,
}

impl ParallelGroup {
    pub fn len(&self) -> usize {
        self.step_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.step_names.is_empty()
    }
}

/// Analyze a workflow to find steps that can run in parallel.
///
/// Returns groups ordered by execution sequence (ascending dependency
/// level). Steps in the same group can run concurrently.
///
/// Errors with [`AgentdagError::StepNotFound`] when a dependency names a
/// step that does not exist, and [`AgentdagError::DependencyCycle`] when
/// the dependency graph is cyclic.
pub fn identify_parallel_groups(workflow: &WorkflowDefinition) -> Result<Vec<ParallelGroup>> {
    if workflow.steps.is_empty() {
        return Ok(Vec::new());
    }

    let known: HashSet<&str> = workflow.steps.iter().map(|s| s.name.as_str()).collect();
    for step in &workflow.steps {
        for dep in &step.depends_on {
            if !known.contains(dep.as_str()) {
                return Err(AgentdagError::StepNotFound(format!(
                    "step '{}' depends on unknown step '{}'",
                    step.name, dep
                )));
            }
        }
    }

    // Assign levels in rounds: a step becomes assignable once all its
    // dependencies have a level.
    let mut levels: HashMap<&str, usize> = HashMap::new();
    let mut remaining: Vec<&WorkflowStep> = workflow.steps.iter().collect();
    let mut current_level = 0usize;

    while !remaining.is_empty() {
        let (ready, rest): (Vec<&WorkflowStep>, Vec<&WorkflowStep>) =
            remaining.into_iter().partition(|s| {
                s.depends_on
                    .iter()
                    .all(|d| levels.contains_key(d.as_str()))
            });

        if ready.is_empty() {
            let stuck: Vec<&str> = rest.iter().map(|s| s.name.as_str()).collect();
            return Err(AgentdagError::DependencyCycle(format!(
                "circular dependency among steps: {}",
                stuck.join(", ")
            )));
        }

        for step in &ready {
            levels.insert(step.name.as_str(), current_level);
        }
        debug!(
            level = current_level,
            assigned = ready.len(),
            "assigned dependency level"
        );

        remaining = rest;
        current_level += 1;
    }

    // Bucket by level; within a group, highest priority first. The sort is
    // stable, so equal priorities keep declaration order.
    let mut groups = Vec::with_capacity(current_level);
    for level in 0..current_level {
        let mut members: Vec<&WorkflowStep> = workflow
            .steps
            .iter()
            .filter(|s| levels.get(s.name.as_str()) == Some(&level))
            .collect();
        members.sort_by_key(|s| Reverse(s.priority));
        groups.push(ParallelGroup {
            step_names: members.iter().map(|s| s.name.clone()).collect(),
        });
    }

    Ok(groups)
}

/// Whether a workflow has any opportunity for parallel execution.
///
/// True iff any group has more than one member.
pub fn can_parallelize(workflow: &WorkflowDefinition) -> Result<bool> {
    let groups = identify_parallel_groups(workflow)?;
    Ok(groups.iter().any(|g| g.len() > 1))
}

/// Annotate steps that can run concurrently with `kind = parallel`.
///
/// Returns a new definition; the annotation is advisory and never
/// consulted for scheduling decisions.
pub fn mark_parallel_steps(workflow: &WorkflowDefinition) -> Result<WorkflowDefinition> {
    let groups = identify_parallel_groups(workflow)?;

    let parallel_names: HashSet<&str> = groups
        .iter()
        .filter(|g| g.len() > 1)
        .flat_map(|g| g.step_names.iter().map(|n| n.as_str()))
        .collect();

    let mut marked = workflow.clone();
    for step in &mut marked.steps {
        if parallel_names.contains(step.name.as_str()) {
            step.kind = StepKind::Parallel;
        }
    }

    Ok(marked)
}
