// src/exec/dispatcher.rs

//! Executes one task against the worker and normalizes its result.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::engine::TaskResult;
use crate::errors::{PlandagError, Result};
use crate::exec::backend::{WorkerBackend, WorkerOutcome};
use crate::plan::Task;

const NONE_PLACEHOLDER: &str = "None";

/// Build the worker payload for a task.
///
/// The layout is fixed so the worker always sees the same four sections;
/// missing inputs or notes render as `None` rather than being left out.
/// Inputs appear in the order the task declared them.
pub fn build_payload(task: &Task, inputs: &[TaskResult]) -> String {
    let inputs_section = if inputs.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        let mut s = String::new();
        for input in inputs {
            let _ = writeln!(s, "[{}]", input.id);
            let _ = writeln!(s, "{}", input.output);
            if let Some(err) = &input.error {
                let _ = writeln!(s, "error: {err}");
            }
        }
        s.trim_end().to_string()
    };

    let notes = task
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(NONE_PLACEHOLDER);

    format!(
        "Task Instructions:\n{}\n\nSuccess Criteria:\n{}\n\nInputs:\n{}\n\nNotes:\n{}",
        task.instructions, task.success_criteria, inputs_section, notes
    )
}

/// Runs tasks against a shared worker.
#[derive(Clone)]
pub struct Dispatcher {
    worker: Arc<dyn WorkerBackend>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(worker: Arc<dyn WorkerBackend>) -> Self {
        Self { worker }
    }

    /// Dispatch `task` with the results of its declared inputs.
    ///
    /// The returned result always carries `task.id`. Budget exhaustion is
    /// downgraded to a result with an empty output and an error message;
    /// any other worker failure is returned as
    /// [`PlandagError::WorkerFailed`].
    pub async fn dispatch(&self, task: &Task, inputs: &[TaskResult]) -> Result<TaskResult> {
        let payload = build_payload(task, inputs);
        debug!(task = %task.id, payload_len = payload.len(), "sending payload to worker");

        match self.worker.execute(payload).await {
            Ok(WorkerOutcome::Completed(mut result)) => {
                if result.id != task.id {
                    if !result.id.is_empty() {
                        warn!(
                            task = %task.id,
                            reported = %result.id,
                            "worker reported a different task id; using the dispatched id"
                        );
                    }
                    result.id = task.id.clone();
                }
                debug!(task = %task.id, failed = result.is_failed(), "worker completed task");
                Ok(result)
            }
            Ok(WorkerOutcome::BudgetExceeded { partial }) => {
                warn!(
                    task = %task.id,
                    partial_len = partial.as_ref().map(|p| p.len()).unwrap_or(0),
                    "worker exceeded its interaction budget; recording degraded result"
                );
                Ok(TaskResult::budget_exceeded(task.id.clone()))
            }
            Err(err) => {
                error!(task = %task.id, error = %format!("{err:#}"), "worker failed");
                Err(PlandagError::WorkerFailed {
                    task: task.id.clone(),
                    message: format!("{err:#}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let mut t = Task::new("task-003", "Compare the two summaries", "A comparison table");
        t.inputs = vec!["task-001".to_string(), "task-002".to_string()];
        t
    }

    #[test]
    fn payload_without_inputs_or_notes_uses_placeholders() {
        let t = Task::new("task-001", "Search the web", "Three sources");
        assert_eq!(
            build_payload(&t, &[]),
            "Task Instructions:\nSearch the web\n\n\
             Success Criteria:\nThree sources\n\n\
             Inputs:\nNone\n\n\
             Notes:\nNone"
        );
    }

    #[test]
    fn payload_lists_inputs_in_declared_order() {
        let mut t = task();
        t.notes = Some("Keep it short".to_string());
        let inputs = vec![
            TaskResult::success("task-001", "US summary"),
            TaskResult::budget_exceeded("task-002"),
        ];

        let payload = build_payload(&t, &inputs);
        let first = payload.find("[task-001]").unwrap();
        let second = payload.find("[task-002]").unwrap();
        assert!(first < second);
        assert!(payload.contains("US summary"));
        assert!(payload.contains("error: worker exceeded the allowed interaction steps"));
        assert!(payload.ends_with("Notes:\nKeep it short"));
    }

    #[test]
    fn payload_is_deterministic() {
        let inputs = vec![
            TaskResult::success("task-001", "a"),
            TaskResult::success("task-002", "b"),
        ];
        assert_eq!(build_payload(&task(), &inputs), build_payload(&task(), &inputs));
    }
}
