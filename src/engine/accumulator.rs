// src/engine/accumulator.rs

//! Write-once store of completed task results.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::{RunResult, TaskResult};
use crate::errors::{PlandagError, Result};
use crate::plan::Task;
use crate::types::TaskId;

/// Thread-safe map of task id to result.
///
/// Cloning is cheap and every clone shares the same storage. Each id may be
/// recorded exactly once; a second write is reported as
/// [`PlandagError::DuplicateResult`] and leaves the first result intact.
#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    inner: Arc<RwLock<HashMap<TaskId, TaskResult>>>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a result under its own id.
    pub fn record(&self, result: TaskResult) -> Result<()> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&result.id) {
            return Err(PlandagError::DuplicateResult(result.id));
        }
        guard.insert(result.id.clone(), result);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<TaskResult> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The results of exactly the tasks `task` declared as inputs, in
    /// declaration order.
    pub fn resolve_inputs(&self, task: &Task) -> Result<Vec<TaskResult>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        task.inputs
            .iter()
            .map(|dep| {
                guard
                    .get(dep)
                    .cloned()
                    .ok_or_else(|| PlandagError::UnresolvedDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    })
            })
            .collect()
    }

    /// Snapshot the store as the terminal run artifact.
    pub fn to_run_result(&self) -> RunResult {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        RunResult {
            results: guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }
}
