// src/exec/parallel.rs

//! Parallel execution of independent workflow steps.
//!
//! A group of mutually independent steps is dispatched to a bounded
//! worker pool (one Tokio task per step, concurrency capped by a
//! semaphore). Each task owns its input and returns a self-contained
//! [`StepResult`]; a runner error or a panicking task is converted into a
//! Failed result without cancelling siblings. The call joins every task
//! before returning, so aggregation happens strictly after the barrier
//! and needs no locks.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::exec::runner::StepRunner;
use crate::workflow::model::{StepName, StepResult, WorkflowStep};

/// How to combine outputs from parallel steps.
///
/// - `Merge`: concatenate all outputs under per-step headers.
/// - `Vote`: select the most frequent output (redundant execution).
/// - `Escalate`: flag divergent outputs for resolution by a higher
///   authority outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    Merge,
    Vote,
    Escalate,
}

impl Default for AggregationStrategy {
    fn default() -> Self {
        AggregationStrategy::Merge
    }
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(AggregationStrategy::Merge),
            "vote" => Ok(AggregationStrategy::Vote),
            "escalate" => Ok(AggregationStrategy::Escalate),
            other => Err(format!(
                "invalid aggregation strategy: {other} (expected \"merge\", \"vote\" or \"escalate\")"
            )),
        }
    }
}

/// Result from parallel step execution.
#[derive(Debug, Clone)]
pub struct ParallelResult {
    /// Per-step results in submission order.
    pub step_results: Vec<StepResult>,
    /// False iff any step failed.
    pub succeeded: bool,
    /// Names of failed steps, in submission order.
    pub failed_steps: Vec<StepName>,
}

impl ParallelResult {
    pub fn new() -> Self {
        Self {
            step_results: Vec::new(),
            succeeded: true,
            failed_steps: Vec::new(),
        }
    }

    /// Outputs of completed steps as ordered `(name, output)` pairs.
    pub fn outputs(&self) -> Vec<(StepName, String)> {
        self.step_results
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| (r.step_name.clone(), r.output.clone()))
            .collect()
    }

    fn record(&mut self, result: StepResult) {
        if !result.succeeded() {
            self.succeeded = false;
            self.failed_steps.push(result.step_name.clone());
        }
        self.step_results.push(result);
    }
}

impl Default for ParallelResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute multiple workflow steps concurrently.
pub struct ParallelStepExecutor {
    runner: Arc<dyn StepRunner>,
    max_workers: Option<usize>,
    aggregation: AggregationStrategy,
}

impl ParallelStepExecutor {
    /// New executor with the default worker bound (available parallelism)
    /// and `Merge` aggregation.
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self {
            runner,
            max_workers: None,
            aggregation: AggregationStrategy::Merge,
        }
    }

    /// Cap the number of concurrently running steps.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Set the default aggregation strategy.
    pub fn with_aggregation(mut self, aggregation: AggregationStrategy) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Execute a group of mutually independent steps concurrently.
    ///
    /// `inputs` maps step names to their input strings; a missing entry
    /// means an empty input. Blocks until every submitted task has
    /// finished. Steps are submitted highest priority first; with fewer
    /// workers than steps this makes execution effectively serial in
    /// priority order.
    pub async fn execute_parallel(
        &self,
        steps: &[WorkflowStep],
        inputs: &HashMap<StepName, String>,
        iteration: u32,
    ) -> ParallelResult {
        let mut result = ParallelResult::new();

        if steps.is_empty() {
            return result;
        }

        // Single step: run directly, no pool machinery.
        if steps.len() == 1 {
            let step = &steps[0];
            let input = inputs.get(&step.name).cloned().unwrap_or_default();
            let step_result = run_one(&*self.runner, step, &input, iteration).await;
            result.record(step_result);
            return result;
        }

        // Stable sort keeps declaration order for equal priorities.
        let mut ordered: Vec<WorkflowStep> = steps.to_vec();
        ordered.sort_by_key(|s| Reverse(s.priority));

        // A zero-sized pool would never grant a permit.
        let workers = self.max_workers.unwrap_or_else(default_workers).max(1);
        debug!(
            steps = ordered.len(),
            workers, iteration, "dispatching parallel group"
        );
        let semaphore = Arc::new(Semaphore::new(workers));

        let mut handles = Vec::with_capacity(ordered.len());
        for step in ordered {
            let input = inputs.get(&step.name).cloned().unwrap_or_default();
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            let name = step.name.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_closed) => {
                        return StepResult::failed(&step.name, "worker pool closed".to_string(), iteration);
                    }
                };
                run_one(&*runner, &step, &input, iteration).await
            });
            handles.push((name, handle));
        }

        // Join barrier: every task finishes before results are combined.
        for (name, handle) in handles {
            match handle.await {
                Ok(step_result) => result.record(step_result),
                Err(join_err) => {
                    error!(step = %name, error = %join_err, "parallel step task aborted");
                    result.record(StepResult::failed(&name, join_err.to_string(), iteration));
                }
            }
        }

        result
    }

    /// Combine outputs from parallel steps into one string.
    ///
    /// `outputs` is an ordered list of `(step name, output)` pairs, as
    /// produced by [`ParallelResult::outputs`]; order determines block
    /// order for `Merge`/`Escalate` and tie-breaking for `Vote`.
    pub fn aggregate_outputs(
        &self,
        outputs: &[(StepName, String)],
        strategy: Option<AggregationStrategy>,
    ) -> String {
        let strategy = strategy.unwrap_or(self.aggregation);

        if outputs.is_empty() {
            return String::new();
        }

        match strategy {
            AggregationStrategy::Merge => outputs
                .iter()
                .map(|(name, output)| format!("## {name}\n{output}"))
                .collect::<Vec<_>>()
                .join("\n\n---\n\n"),

            AggregationStrategy::Vote => most_frequent_output(outputs),

            AggregationStrategy::Escalate => {
                let first = &outputs[0].1;
                if outputs.iter().all(|(_, output)| output == first) {
                    return first.clone();
                }
                let parts = outputs
                    .iter()
                    .map(|(name, output)| format!("### {name}\n{output}"))
                    .collect::<Vec<_>>()
                    .join("\n\n---\n\n");
                format!("## CONFLICT DETECTED - Multiple outputs require resolution\n\n{parts}")
            }
        }
    }
}

/// Invoke the runner for one step, containing failure as a result.
async fn run_one(
    runner: &dyn StepRunner,
    step: &WorkflowStep,
    input: &str,
    iteration: u32,
) -> StepResult {
    match runner.run_step(step, input, iteration).await {
        Ok(output) => StepResult::completed(&step.name, output, iteration),
        Err(e) => {
            warn!(step = %step.name, iteration, error = %e, "parallel step failed");
            StepResult::failed(&step.name, e.to_string(), iteration)
        }
    }
}

/// Most frequent distinct output; ties resolve to the value seen first.
fn most_frequent_output(outputs: &[(StepName, String)]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for (_, output) in outputs {
        match counts.iter_mut().find(|entry| entry.0 == output.as_str()) {
            Some(entry) => entry.1 += 1,
            None => counts.push((output.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string()).unwrap_or_default()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}
