// src/engine/mod.rs

//! Orchestration engine for plandag.
//!
//! This module ties together:
//! - the pure ready-set scheduler from [`crate::dag`]
//! - the result accumulator that doubles as dependency-input store
//! - the optional progress sink for outside observers
//! - the async orchestrator that dispatches each round concurrently and
//!   funnels every completion back through one coordinating loop
//!
//! The scheduling semantics live in [`crate::dag::Scheduler`]; the async/IO
//! shell is implemented in [`runtime`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TaskId;

/// Error text recorded when the worker runs out of interaction steps.
pub const BUDGET_EXCEEDED_ERROR: &str =
    "worker exceeded the allowed interaction steps and could not complete the task";

/// Outcome of one dispatched task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: TaskId,
    #[serde(default)]
    pub output: String,
    /// Set when the task completed in a degraded way. Accepts `errors` as
    /// an alias on input.
    #[serde(default, alias = "errors")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(id: impl Into<TaskId>, output: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(id: impl Into<TaskId>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// The synthetic result for a worker that exhausted its budget.
    pub fn budget_exceeded(id: impl Into<TaskId>) -> Self {
        Self::failed(id, BUDGET_EXCEEDED_ERROR)
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Every task result of one completed run, keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub results: BTreeMap<TaskId, TaskResult>,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TaskResult> {
        self.results.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &TaskResult)> {
        self.results.iter()
    }

    /// Results that carry an error.
    pub fn failed(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.values().filter(|r| r.is_failed())
    }
}

pub mod accumulator;
pub mod progress;
pub mod runtime;

pub use accumulator::ResultAccumulator;
pub use progress::{ProgressEvent, ProgressSink};
pub use runtime::{ABORTED_ERROR, Orchestrator, OrchestratorOptions};
