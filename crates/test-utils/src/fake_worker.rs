use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use plandag::engine::TaskResult;
use plandag::exec::{WorkerBackend, WorkerOutcome};
use plandag::plan::Plan;

/// What the scripted worker does for one task.
#[derive(Debug, Clone)]
pub enum Script {
    /// Succeed with `output of <id>`.
    Succeed,
    /// Succeed with the given output.
    Output(String),
    /// Report a result carrying an error.
    Error(String),
    /// Report that the interaction budget ran out.
    BudgetExceeded,
    /// Fail hard.
    Fail(String),
    /// Succeed but report another task id.
    WrongId(String),
}

/// One entry in the worker's event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Started(String),
    Finished(String),
}

#[derive(Debug, Default)]
struct Shared {
    log: Vec<WorkerEvent>,
    payloads: HashMap<String, String>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// A fake worker that:
/// - recognises tasks by their instructions (first payload section)
/// - sleeps for a per-task delay so tests control completion order
/// - answers according to a per-task [`Script`]
/// - records start/finish order, payloads and peak concurrency
#[derive(Debug, Clone)]
pub struct ScriptedWorker {
    by_instructions: HashMap<String, String>,
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    default_script: Script,
    shared: Arc<Mutex<Shared>>,
}

impl ScriptedWorker {
    pub fn for_plan(plan: &Plan) -> Self {
        let by_instructions = plan
            .tasks
            .iter()
            .map(|t| (t.instructions.clone(), t.id.clone()))
            .collect();

        Self {
            by_instructions,
            scripts: HashMap::new(),
            delays: HashMap::new(),
            default_script: Script::Succeed,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn script(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }

    pub fn delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn default_script(mut self, script: Script) -> Self {
        self.default_script = script;
        self
    }

    pub fn log(&self) -> Vec<WorkerEvent> {
        self.shared.lock().unwrap().log.clone()
    }

    pub fn payload_for(&self, id: &str) -> Option<String> {
        self.shared.lock().unwrap().payloads.get(id).cloned()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.shared.lock().unwrap().peak_in_flight
    }

    /// Ids in the order the worker started them.
    pub fn started(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|e| match e {
                WorkerEvent::Started(id) => Some(id),
                WorkerEvent::Finished(_) => None,
            })
            .collect()
    }

    /// Position of an event in the log.
    pub fn position(&self, event: &WorkerEvent) -> Option<usize> {
        self.log().iter().position(|e| e == event)
    }

    fn identify(&self, payload: &str) -> Option<String> {
        let instructions = payload
            .strip_prefix("Task Instructions:\n")?
            .split("\n\nSuccess Criteria:")
            .next()?;
        self.by_instructions.get(instructions).cloned()
    }
}

impl WorkerBackend for ScriptedWorker {
    fn execute(
        &self,
        payload: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<WorkerOutcome>> + Send + '_>> {
        Box::pin(async move {
            let Some(id) = self.identify(&payload) else {
                bail!("unscripted payload: {payload}");
            };

            {
                let mut shared = self.shared.lock().unwrap();
                shared.log.push(WorkerEvent::Started(id.clone()));
                shared.payloads.insert(id.clone(), payload);
                shared.in_flight += 1;
                shared.peak_in_flight = shared.peak_in_flight.max(shared.in_flight);
            }

            if let Some(delay) = self.delays.get(&id) {
                tokio::time::sleep(*delay).await;
            }

            {
                let mut shared = self.shared.lock().unwrap();
                shared.log.push(WorkerEvent::Finished(id.clone()));
                shared.in_flight -= 1;
            }

            let script = self.scripts.get(&id).unwrap_or(&self.default_script).clone();
            match script {
                Script::Succeed => Ok(WorkerOutcome::Completed(TaskResult::success(
                    id.clone(),
                    format!("output of {id}"),
                ))),
                Script::Output(out) => Ok(WorkerOutcome::Completed(TaskResult::success(id, out))),
                Script::Error(err) => Ok(WorkerOutcome::Completed(TaskResult {
                    id,
                    output: "partial".to_string(),
                    error: Some(err),
                })),
                Script::BudgetExceeded => Ok(WorkerOutcome::BudgetExceeded {
                    partial: Some("half-done".to_string()),
                }),
                Script::Fail(msg) => bail!("{msg}"),
                Script::WrongId(other) => Ok(WorkerOutcome::Completed(TaskResult::success(
                    other,
                    format!("output of {id}"),
                ))),
            }
        })
    }
}
