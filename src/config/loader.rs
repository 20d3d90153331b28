// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::RawWorkflowDoc;
use crate::errors::{AgentdagError, Result};
use crate::workflow::model::WorkflowDefinition;

/// Parse a workflow document from a YAML string.
///
/// This only performs deserialization; it does **not** run semantic
/// validation (backward-only dependencies, mode constraints, etc.). Use
/// [`load_and_validate`] for that. Structural errors (not a mapping,
/// missing `name`, `steps` not a list, an unrecognized `kind` or
/// `coordination_mode`) fail here, before a definition exists.
pub fn parse_workflow(contents: &str) -> Result<WorkflowDefinition> {
    let raw: RawWorkflowDoc = serde_yaml::from_str(contents)?;
    Ok(raw.into())
}

/// Load a workflow document from a file path.
pub fn load_workflow(path: impl AsRef<Path>) -> Result<WorkflowDefinition> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_workflow(&contents)
}

/// Load a workflow document and run semantic validation.
///
/// This is the recommended entry point for callers that want a
/// known-good definition:
///
/// - Reads + deserializes YAML (fail-fast on structural errors).
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Runs `validate()` and folds a non-empty finding list into a single
///   [`AgentdagError::ConfigError`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowDefinition> {
    let workflow = load_workflow(&path)?;
    let errors = workflow.validate();
    if !errors.is_empty() {
        return Err(AgentdagError::ConfigError(errors.join("; ")));
    }
    Ok(workflow)
}

/// Helper to resolve a default workflow document path.
///
/// Currently this just returns `workflow.yaml` in the current working
/// directory; it exists so discovery can later respect an env var or
/// search multiple locations.
pub fn default_workflow_path() -> PathBuf {
    PathBuf::from("workflow.yaml")
}
