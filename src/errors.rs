// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum PlandagError {
    #[error("No plan was provided")]
    NilPlan,

    #[error("Duplicate task id in plan: {0}")]
    DuplicateTask(TaskId),

    #[error("Task '{task}' depends on '{dependency}', which has no result")]
    UnresolvedDependency { task: TaskId, dependency: TaskId },

    #[error("Cycle detected in task graph: {0}")]
    DependencyCycle(String),

    #[error("Result for task '{0}' was recorded more than once")]
    DuplicateResult(TaskId),

    #[error("Worker failed on task '{task}': {message}")]
    WorkerFailed { task: TaskId, message: String },

    #[error("Run finished without results for: {}", missing.join(", "))]
    IncompleteRun { missing: Vec<TaskId> },

    #[error("Planning failed: {0}")]
    PlanningFailure(String),

    #[error("Consolidation failed: {0}")]
    ConsolidationFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlandagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_dependency_names_both_ids() {
        let err = PlandagError::UnresolvedDependency {
            task: "task-002".to_string(),
            dependency: "task-009".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Task 'task-002' depends on 'task-009', which has no result"
        );
    }

    #[test]
    fn incomplete_run_lists_missing_tasks() {
        let err = PlandagError::IncompleteRun {
            missing: vec!["task-001".to_string(), "task-002".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Run finished without results for: task-001, task-002"
        );
    }
}
