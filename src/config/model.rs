// src/config/model.rs

//! Raw document types for the declarative workflow format.
//!
//! These mirror the YAML shape one-to-one (`inputs_from` instead of the
//! model's `depends_on`) and carry serde defaults for everything the
//! format treats as optional. Deserialization is the fail-fast boundary:
//! a document that is not a mapping, lacks a `name`, has a non-list
//! `steps`, a non-mapping step entry, or an unrecognized `kind` /
//! `coordination_mode` value is rejected here. Missing step-level scalars
//! merely default and are left for `validate()` to report.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::workflow::model::{CoordinationMode, StepKind, WorkflowDefinition, WorkflowStep};

/// One step entry as written in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStepEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub kind: StepKind,
    #[serde(default)]
    pub inputs_from: Vec<String>,
    #[serde(default)]
    pub prompt_template: String,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub is_coordinator: bool,
    #[serde(default)]
    pub subordinates: Vec<String>,
    #[serde(default)]
    pub priority: i64,
}

impl From<RawStepEntry> for WorkflowStep {
    fn from(raw: RawStepEntry) -> Self {
        WorkflowStep {
            name: raw.name,
            agent: raw.agent,
            kind: raw.kind,
            depends_on: raw.inputs_from,
            prompt_template: raw.prompt_template,
            max_retries: raw.max_retries,
            condition: raw.condition,
            is_coordinator: raw.is_coordinator,
            subordinates: raw.subordinates,
            priority: raw.priority,
        }
    }
}

/// Top-level workflow document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowDoc {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<RawStepEntry>,
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

impl From<RawWorkflowDoc> for WorkflowDefinition {
    fn from(raw: RawWorkflowDoc) -> Self {
        WorkflowDefinition {
            name: raw.name,
            steps: raw.steps.into_iter().map(WorkflowStep::from).collect(),
            max_iterations: raw.max_iterations,
            coordination_mode: raw.coordination_mode,
            metadata: raw.metadata,
        }
    }
}
