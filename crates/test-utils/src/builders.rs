#![allow(dead_code)]

use agentdag::workflow::{
    CoordinationMode, StepKind, WorkflowDefinition, WorkflowStep,
};
use std::collections::BTreeMap;

/// Builder for `WorkflowDefinition` to simplify test setup.
pub struct WorkflowBuilder {
    workflow: WorkflowDefinition,
}

impl WorkflowBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            workflow: WorkflowDefinition {
                name: name.to_string(),
                steps: Vec::new(),
                max_iterations: 1,
                coordination_mode: CoordinationMode::Centralized,
                metadata: BTreeMap::new(),
            },
        }
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.workflow.steps.push(step);
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.workflow.max_iterations = max_iterations;
        self
    }

    pub fn coordination_mode(mut self, mode: CoordinationMode) -> Self {
        self.workflow.coordination_mode = mode;
        self
    }

    pub fn build(self) -> WorkflowDefinition {
        self.workflow
    }
}

/// Builder for `WorkflowStep`.
pub struct StepBuilder {
    step: WorkflowStep,
}

impl StepBuilder {
    pub fn new(name: &str, agent: &str) -> Self {
        Self {
            step: WorkflowStep {
                name: name.to_string(),
                agent: agent.to_string(),
                kind: StepKind::Agent,
                depends_on: Vec::new(),
                prompt_template: String::new(),
                max_retries: 0,
                condition: String::new(),
                is_coordinator: false,
                subordinates: Vec::new(),
                priority: 0,
            },
        }
    }

    pub fn inputs_from(mut self, dep: &str) -> Self {
        self.step.depends_on.push(dep.to_string());
        self
    }

    pub fn kind(mut self, kind: StepKind) -> Self {
        self.step.kind = kind;
        self
    }

    pub fn prompt_template(mut self, template: &str) -> Self {
        self.step.prompt_template = template.to_string();
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.step.max_retries = max_retries;
        self
    }

    pub fn condition(mut self, condition: &str) -> Self {
        self.step.condition = condition.to_string();
        self
    }

    pub fn coordinator(mut self, subordinates: &[&str]) -> Self {
        self.step.is_coordinator = true;
        self.step.subordinates = subordinates.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.step.priority = priority;
        self
    }

    pub fn build(self) -> WorkflowStep {
        self.step
    }
}
