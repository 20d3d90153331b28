// src/lib.rs

pub mod cli;
pub mod config;
pub mod coordination;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod workflow;

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::load_workflow;
use crate::coordination::{build_execution_plan, strategy_for};
use crate::dag::identify_parallel_groups;
use crate::workflow::WorkflowDefinition;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - workflow document loading
/// - semantic validation
/// - plan / parallel-group inspection output
///
/// The CLI never executes steps; the concrete step runner lives with the
/// embedding application.
pub fn run(args: CliArgs) -> Result<()> {
    let workflow_path = PathBuf::from(&args.workflow);
    let workflow = load_workflow(&workflow_path)?;

    let errors = workflow.validate();
    if !errors.is_empty() {
        println!("workflow '{}' is invalid:", workflow.name);
        for error in &errors {
            println!("  - {error}");
        }
        anyhow::bail!("validation failed with {} error(s)", errors.len());
    }

    println!("workflow '{}' is valid", workflow.name);

    if args.validate_only {
        debug!("validate-only; skipping plan output");
        return Ok(());
    }

    print_plan(&workflow)
}

/// Dry-run output: steps, execution order, phases, and parallel groups.
fn print_plan(workflow: &WorkflowDefinition) -> Result<()> {
    println!(
        "  coordination_mode = {:?}",
        workflow.coordination_mode
    );
    println!("  max_iterations = {}", workflow.max_iterations);
    println!();

    println!("steps ({}):", workflow.steps.len());
    for step in &workflow.steps {
        println!("  - {}", step.name);
        println!("      agent: {}", step.agent);
        if !step.depends_on.is_empty() {
            println!("      inputs_from: {:?}", step.depends_on);
        }
        if !step.condition.is_empty() {
            println!("      condition: {}", step.condition);
        }
        if step.max_retries > 0 {
            println!("      max_retries: {}", step.max_retries);
        }
        if step.is_coordinator {
            println!("      coordinator of: {:?}", step.subordinates);
        }
        if step.priority != 0 {
            println!("      priority: {}", step.priority);
        }
    }
    println!();

    let strategy = strategy_for(workflow.coordination_mode);
    let ordered = strategy.order_steps(workflow);
    println!(
        "execution order: {:?}",
        ordered.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );

    let plan = build_execution_plan(workflow)?;
    println!("phases:");
    for (i, phase) in plan.iter().enumerate() {
        println!("  {}: {:?}", i + 1, phase);
    }

    let groups = identify_parallel_groups(workflow)?;
    println!("parallel groups:");
    for group in &groups {
        let marker = if group.len() > 1 { " (parallel)" } else { "" };
        println!("  {:?}{marker}", group.step_names);
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
