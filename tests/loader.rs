// tests/loader.rs

use std::io::Write;

use tempfile::NamedTempFile;

use agentdag::config::{load_and_validate, load_workflow, parse_workflow};
use agentdag::errors::AgentdagError;
use agentdag::workflow::{CoordinationMode, StepKind};

#[test]
fn parse_minimal_document() {
    let wf = parse_workflow(
        r#"
name: simple
steps:
  - name: analyze
    agent: analyst
"#,
    )
    .unwrap();

    assert_eq!(wf.name, "simple");
    assert_eq!(wf.steps.len(), 1);
    assert_eq!(wf.steps[0].agent, "analyst");
    // Defaults.
    assert_eq!(wf.max_iterations, 1);
    assert_eq!(wf.coordination_mode, CoordinationMode::Centralized);
    assert_eq!(wf.steps[0].kind, StepKind::Agent);
    assert_eq!(wf.steps[0].max_retries, 0);
    assert_eq!(wf.steps[0].priority, 0);
}

#[test]
fn inputs_from_maps_to_depends_on() {
    let wf = parse_workflow(
        r#"
name: chained
steps:
  - name: a
    agent: analyst
  - name: b
    agent: critic
    inputs_from: [a]
"#,
    )
    .unwrap();

    assert_eq!(wf.steps[1].depends_on, vec!["a".to_string()]);
}

#[test]
fn parse_full_step_fields() {
    let wf = parse_workflow(
        r#"
name: full
max_iterations: 5
coordination_mode: hierarchical
metadata:
  owner: platform
steps:
  - name: w1
    agent: analyst
    kind: conditional
    condition: "has:w0"
    prompt_template: "Review {input}"
    max_retries: 2
    priority: 7
  - name: lead
    agent: orchestrator
    is_coordinator: true
    subordinates: [w1]
"#,
    )
    .unwrap();

    assert_eq!(wf.max_iterations, 5);
    assert_eq!(wf.coordination_mode, CoordinationMode::Hierarchical);
    assert_eq!(wf.metadata.len(), 1);

    let w1 = wf.get_step("w1").unwrap();
    assert_eq!(w1.kind, StepKind::Conditional);
    assert_eq!(w1.condition, "has:w0");
    assert_eq!(w1.prompt_template, "Review {input}");
    assert_eq!(w1.max_retries, 2);
    assert_eq!(w1.priority, 7);

    let lead = wf.get_step("lead").unwrap();
    assert!(lead.is_coordinator);
    assert_eq!(lead.subordinates, vec!["w1".to_string()]);
}

#[test]
fn parse_mesh_mode() {
    let wf = parse_workflow(
        r#"
name: peers
coordination_mode: mesh
steps:
  - name: a
    agent: analyst
  - name: b
    agent: critic
"#,
    )
    .unwrap();

    assert_eq!(wf.coordination_mode, CoordinationMode::Mesh);
}

#[test]
fn non_mapping_document_fails_fast() {
    let result = parse_workflow("just a string");
    assert!(matches!(result, Err(AgentdagError::YamlError(_))));
}

#[test]
fn missing_name_fails_fast() {
    let result = parse_workflow(
        r#"
steps:
  - name: a
    agent: analyst
"#,
    );
    match result {
        Err(AgentdagError::YamlError(e)) => {
            assert!(e.to_string().contains("name"), "unexpected error: {e}");
        }
        other => panic!("expected YamlError, got: {other:?}"),
    }
}

#[test]
fn steps_not_a_list_fails_fast() {
    let result = parse_workflow(
        r#"
name: bad
steps: "not a list"
"#,
    );
    assert!(matches!(result, Err(AgentdagError::YamlError(_))));
}

#[test]
fn step_entry_not_a_mapping_fails_fast() {
    let result = parse_workflow(
        r#"
name: bad
steps:
  - "not a mapping"
"#,
    );
    assert!(matches!(result, Err(AgentdagError::YamlError(_))));
}

#[test]
fn unknown_coordination_mode_fails_fast() {
    let result = parse_workflow(
        r#"
name: bad
coordination_mode: starfish
steps:
  - name: a
    agent: analyst
"#,
    );
    assert!(matches!(result, Err(AgentdagError::YamlError(_))));
}

#[test]
fn unknown_step_kind_fails_fast() {
    let result = parse_workflow(
        r#"
name: bad
steps:
  - name: a
    agent: analyst
    kind: bogus
"#,
    );
    assert!(matches!(result, Err(AgentdagError::YamlError(_))));
}

#[test]
fn missing_step_agent_defaults_and_is_left_to_validate() {
    let wf = parse_workflow(
        r#"
name: lax
steps:
  - name: a
"#,
    )
    .unwrap();

    assert_eq!(wf.steps[0].agent, "");
    assert!(wf
        .validate()
        .iter()
        .any(|e| e.contains("requires an agent type")));
}

#[test]
fn load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
name: file-test
max_iterations: 2
steps:
  - name: a
    agent: analyst
  - name: b
    agent: critic
    inputs_from: [a]
"#
    )
    .unwrap();

    let wf = load_workflow(file.path()).unwrap();
    assert_eq!(wf.name, "file-test");
    assert_eq!(wf.steps.len(), 2);
    assert_eq!(wf.max_iterations, 2);
}

#[test]
fn load_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_workflow(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(AgentdagError::IoError(_))));
}

#[test]
fn load_and_validate_folds_findings_into_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
name: forward
steps:
  - name: a
    agent: analyst
    inputs_from: [b]
  - name: b
    agent: critic
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(AgentdagError::ConfigError(msg)) => {
            assert!(msg.contains("not defined before it"));
        }
        other => panic!("expected ConfigError, got: {other:?}"),
    }
}
