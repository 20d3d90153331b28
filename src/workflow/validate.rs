// src/workflow/validate.rs

//! Structural validation of workflow definitions.
//!
//! `validate()` accumulates every finding into a list of messages instead
//! of stopping at the first one; an empty list means the definition is
//! valid. The executor consults this list and refuses to start on any
//! non-empty result. Contrast with the loader, which fails fast on
//! malformed documents before a `WorkflowDefinition` even exists.

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::workflow::model::{CoordinationMode, WorkflowDefinition};

impl WorkflowDefinition {
    /// Check the definition for structural errors.
    ///
    /// Returns a list of error messages. Empty list means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = Vec::new();

        if self.name.is_empty() {
            errors.push("Workflow name is required".to_string());
        }
        if self.steps.is_empty() {
            errors.push("Workflow must have at least one step".to_string());
        }

        // Names of all steps examined so far; declaration order is
        // authoritative, so a forward reference is an error even when the
        // referenced step exists later in the list.
        let mut seen: HashSet<&str> = HashSet::new();

        for step in &self.steps {
            if step.name.is_empty() {
                errors.push("Step name is required".to_string());
            }
            if !seen.insert(step.name.as_str()) {
                errors.push(format!("Duplicate step name: {}", step.name));
            }

            if step.agent.is_empty() {
                errors.push(format!("Step '{}' requires an agent type", step.name));
            }

            for dep in &step.depends_on {
                if !seen.contains(dep.as_str()) {
                    errors.push(format!(
                        "Step '{}' depends on '{}' which is not defined before it",
                        step.name, dep
                    ));
                }
            }

            // Condition references (e.g. has:step_name, empty:step_name)
            // must point at an already-seen step.
            if let Some((_, target)) = step.condition.split_once(':') {
                let target = target.trim();
                if !seen.contains(target) {
                    errors.push(format!(
                        "Step '{}' references unknown step '{}' in condition",
                        step.name, target
                    ));
                }
            }
        }

        if self.max_iterations < 1 {
            errors.push("max_iterations must be at least 1".to_string());
        }

        match self.coordination_mode {
            CoordinationMode::Hierarchical => {
                let coordinators: Vec<_> =
                    self.steps.iter().filter(|s| s.is_coordinator).collect();
                if coordinators.is_empty() {
                    errors.push(
                        "Hierarchical mode requires at least one step with is_coordinator=true"
                            .to_string(),
                    );
                }
                // Subordinates are checked against the full step set, so a
                // coordinator may be declared before its subordinates.
                for coord in coordinators {
                    for sub in &coord.subordinates {
                        if !seen.contains(sub.as_str()) {
                            errors.push(format!(
                                "Coordinator '{}' references unknown subordinate '{}'",
                                coord.name, sub
                            ));
                        }
                    }
                }
            }
            CoordinationMode::Mesh => {
                if self.steps.len() < 2 {
                    errors.push("Mesh mode requires at least 2 steps".to_string());
                }
            }
            CoordinationMode::Centralized => {}
        }

        if let Some(step) = find_cycle(self) {
            errors.push(format!(
                "Dependency cycle detected involving step '{step}'"
            ));
        }

        errors
    }
}

/// Detect a cycle in the `depends_on` graph.
///
/// Edge direction: dep -> step. A topological sort fails exactly when the
/// graph has a cycle; the offending node is reported back so the message
/// can name a participating step.
fn find_cycle(workflow: &WorkflowDefinition) -> Option<String> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for step in &workflow.steps {
        graph.add_node(step.name.as_str());
    }
    for step in &workflow.steps {
        for dep in &step.depends_on {
            graph.add_edge(dep.as_str(), step.name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => None,
        Err(cycle) => Some(cycle.node_id().to_string()),
    }
}
