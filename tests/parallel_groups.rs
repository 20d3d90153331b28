// tests/parallel_groups.rs

use std::collections::HashSet;

use agentdag::dag::{can_parallelize, identify_parallel_groups, mark_parallel_steps};
use agentdag::errors::AgentdagError;
use agentdag::workflow::{CoordinationMode, StepKind};
use agentdag_test_utils::builders::{StepBuilder, WorkflowBuilder};

#[test]
fn sequential_chain_yields_singleton_groups() {
    let wf = WorkflowBuilder::new("chain")
        .with_step(StepBuilder::new("a", "analyst").build())
        .with_step(StepBuilder::new("b", "critic").inputs_from("a").build())
        .with_step(StepBuilder::new("c", "editor").inputs_from("b").build())
        .build();

    let groups = identify_parallel_groups(&wf).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].step_names, vec!["a"]);
    assert_eq!(groups[1].step_names, vec!["b"]);
    assert_eq!(groups[2].step_names, vec!["c"]);
}

#[test]
fn independent_steps_share_one_group() {
    let wf = WorkflowBuilder::new("fanout")
        .with_step(StepBuilder::new("a", "analyst").build())
        .with_step(StepBuilder::new("b", "critic").build())
        .with_step(StepBuilder::new("c", "devops").build())
        .coordination_mode(CoordinationMode::Mesh)
        .build();

    let groups = identify_parallel_groups(&wf).unwrap();
    assert_eq!(groups.len(), 1);
    let names: HashSet<&str> = groups[0].step_names.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, HashSet::from(["a", "b", "c"]));
}

#[test]
fn diamond_dependency_levels() {
    let wf = WorkflowBuilder::new("diamond")
        .with_step(StepBuilder::new("a", "analyst").build())
        .with_step(StepBuilder::new("b", "critic").inputs_from("a").build())
        .with_step(StepBuilder::new("c", "devops").inputs_from("a").build())
        .with_step(
            StepBuilder::new("d", "editor")
                .inputs_from("b")
                .inputs_from("c")
                .build(),
        )
        .build();

    let groups = identify_parallel_groups(&wf).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].step_names, vec!["a"]);
    let mid: HashSet<&str> = groups[1].step_names.iter().map(|s| s.as_str()).collect();
    assert_eq!(mid, HashSet::from(["b", "c"]));
    assert_eq!(groups[2].step_names, vec!["d"]);
}

#[test]
fn empty_workflow_has_no_groups() {
    let wf = WorkflowBuilder::new("empty").build();
    let groups = identify_parallel_groups(&wf).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn group_members_are_ordered_by_priority() {
    let wf = WorkflowBuilder::new("priority")
        .with_step(StepBuilder::new("low", "analyst").priority(1).build())
        .with_step(StepBuilder::new("high", "security").priority(10).build())
        .with_step(StepBuilder::new("mid", "devops").priority(5).build())
        .build();

    let groups = identify_parallel_groups(&wf).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].step_names, vec!["high", "mid", "low"]);
}

#[test]
fn equal_priorities_keep_declaration_order() {
    let wf = WorkflowBuilder::new("ties")
        .with_step(StepBuilder::new("first", "analyst").build())
        .with_step(StepBuilder::new("second", "critic").build())
        .with_step(StepBuilder::new("boosted", "devops").priority(3).build())
        .build();

    let groups = identify_parallel_groups(&wf).unwrap();
    assert_eq!(groups[0].step_names, vec!["boosted", "first", "second"]);
}

#[test]
fn circular_dependency_is_a_hard_error() {
    let wf = WorkflowBuilder::new("circular")
        .with_step(StepBuilder::new("a", "analyst").inputs_from("b").build())
        .with_step(StepBuilder::new("b", "critic").inputs_from("a").build())
        .build();

    let result = identify_parallel_groups(&wf);
    match result {
        Err(AgentdagError::DependencyCycle(msg)) => {
            assert!(msg.contains("a") && msg.contains("b"));
        }
        other => panic!("expected DependencyCycle, got: {other:?}"),
    }
}

#[test]
fn unknown_dependency_is_reported_as_step_not_found() {
    let wf = WorkflowBuilder::new("dangling")
        .with_step(StepBuilder::new("a", "analyst").inputs_from("ghost").build())
        .build();

    let result = identify_parallel_groups(&wf);
    assert!(matches!(result, Err(AgentdagError::StepNotFound(_))));
}

#[test]
fn can_parallelize_detects_wide_groups() {
    let wide = WorkflowBuilder::new("wide")
        .with_step(StepBuilder::new("a", "analyst").build())
        .with_step(StepBuilder::new("b", "critic").build())
        .build();
    assert!(can_parallelize(&wide).unwrap());

    let chain = WorkflowBuilder::new("chain")
        .with_step(StepBuilder::new("a", "analyst").build())
        .with_step(StepBuilder::new("b", "critic").inputs_from("a").build())
        .build();
    assert!(!can_parallelize(&chain).unwrap());

    let single = WorkflowBuilder::new("single")
        .with_step(StepBuilder::new("a", "analyst").build())
        .build();
    assert!(!can_parallelize(&single).unwrap());
}

#[test]
fn mark_parallel_steps_annotates_wide_groups_only() {
    let wf = WorkflowBuilder::new("mixed")
        .with_step(StepBuilder::new("a", "analyst").max_retries(2).build())
        .with_step(StepBuilder::new("b", "critic").build())
        .with_step(
            StepBuilder::new("join", "editor")
                .inputs_from("a")
                .inputs_from("b")
                .build(),
        )
        .build();

    let marked = mark_parallel_steps(&wf).unwrap();

    assert_eq!(marked.get_step("a").unwrap().kind, StepKind::Parallel);
    assert_eq!(marked.get_step("b").unwrap().kind, StepKind::Parallel);
    assert_eq!(marked.get_step("join").unwrap().kind, StepKind::Agent);

    // Annotation only; everything else is preserved.
    assert_eq!(marked.get_step("a").unwrap().max_retries, 2);
    assert_eq!(
        marked.get_step("join").unwrap().depends_on,
        vec!["a".to_string(), "b".to_string()]
    );
    // The original definition is untouched.
    assert_eq!(wf.get_step("a").unwrap().kind, StepKind::Agent);
}
