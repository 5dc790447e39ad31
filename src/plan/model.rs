// src/plan/model.rs

use serde::{Deserialize, Serialize};

use crate::types::TaskId;

/// A plan as produced by the planner.
///
/// ```json
/// {
///   "goal": "Summarise climate policy developments",
///   "tasks": [
///     { "id": "task-001", "instructions": "...", "success_criteria": "..." },
///     { "id": "task-002", "instructions": "...", "success_criteria": "...",
///       "inputs": ["task-001"] }
///   ]
/// }
/// ```
///
/// The task list is also accepted under the key `plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// The planner's interpretation of the objective.
    pub goal: String,

    /// Tasks in plan order. Plan order decides which ready tasks are
    /// dispatched first within a round.
    #[serde(default, alias = "plan")]
    pub tasks: Vec<Task>,
}

impl Plan {
    pub fn new(goal: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            goal: goal.into(),
            tasks,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id (first match).
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// One unit of work in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, stable id (conventionally `task-NNN`).
    pub id: TaskId,

    /// What the worker should do.
    pub instructions: String,

    /// Objective check for "done".
    pub success_criteria: String,

    /// Ids of tasks whose outputs this task consumes.
    #[serde(default)]
    pub inputs: Vec<TaskId>,

    /// Hints, assumptions or constraints.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        instructions: impl Into<String>,
        success_criteria: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            instructions: instructions.into(),
            success_criteria: success_criteria.into(),
            inputs: Vec::new(),
            notes: None,
        }
    }
}
