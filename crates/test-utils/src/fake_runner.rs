use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use agentdag::errors::Result;
use agentdag::exec::StepRunner;
use agentdag::workflow::WorkflowStep;

/// One recorded runner call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: String,
    pub input: String,
    pub iteration: u32,
}

/// A scripted step runner that:
/// - records every invocation (step name, combined input, iteration)
/// - returns a configured output per step (default: `out:<name>`)
/// - can fail the first N attempts of a step, or fail it on every attempt.
pub struct FakeRunner {
    outputs: HashMap<String, String>,
    fail_counts: Mutex<HashMap<String, u32>>,
    always_fail: HashSet<String>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            fail_counts: Mutex::new(HashMap::new()),
            always_fail: HashSet::new(),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the output returned for a step.
    pub fn with_output(mut self, step: &str, output: &str) -> Self {
        self.outputs.insert(step.to_string(), output.to_string());
        self
    }

    /// Fail the first `attempts` invocations of a step, then succeed.
    pub fn failing_attempts(mut self, step: &str, attempts: u32) -> Self {
        self.fail_counts
            .get_mut()
            .unwrap()
            .insert(step.to_string(), attempts);
        self
    }

    /// Fail every invocation of a step.
    pub fn always_failing(mut self, step: &str) -> Self {
        self.always_fail.insert(step.to_string());
        self
    }

    /// Shared handle to the invocation log; grab it before wrapping the
    /// runner in an `Arc<dyn StepRunner>`.
    pub fn recorded(&self) -> Arc<Mutex<Vec<Invocation>>> {
        Arc::clone(&self.invocations)
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRunner for FakeRunner {
    fn run_step<'a>(
        &'a self,
        step: &'a WorkflowStep,
        combined_input: &'a str,
        iteration: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(Invocation {
                step: step.name.clone(),
                input: combined_input.to_string(),
                iteration,
            });

            if self.always_fail.contains(&step.name) {
                return Err(anyhow::anyhow!("step '{}' failed (scripted)", step.name).into());
            }

            {
                let mut counts = self.fail_counts.lock().unwrap();
                if let Some(remaining) = counts.get_mut(&step.name) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(anyhow::anyhow!(
                            "step '{}' failed (scripted attempt)",
                            step.name
                        )
                        .into());
                    }
                }
            }

            Ok(self
                .outputs
                .get(&step.name)
                .cloned()
                .unwrap_or_else(|| format!("out:{}", step.name)))
        })
    }
}
