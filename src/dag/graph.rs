// src/dag/graph.rs

use std::collections::HashMap;

use tracing::warn;

use crate::errors::{PlandagError, Result};
use crate::plan::{Plan, Task};
use crate::types::TaskId;

/// Internal node structure: the task plus its reverse edges.
#[derive(Debug, Clone)]
struct TaskNode {
    task: Task,
    /// Direct dependents: tasks that list this one in their `inputs`, in
    /// plan order.
    dependents: Vec<TaskId>,
}

/// In-memory dependency structure keyed by task id.
///
/// Construction does not check that dependencies exist or that the graph is
/// acyclic; [`crate::plan::validate_plan`] does that. Edges pointing at
/// unknown ids are kept so that their dependents simply never become ready.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// Task ids in plan order.
    order: Vec<TaskId>,
    nodes: HashMap<TaskId, TaskNode>,
    /// Dependents of ids that are not tasks in the plan.
    dangling: HashMap<TaskId, Vec<TaskId>>,
}

impl TaskGraph {
    /// Build the graph from a plan. An absent plan is an error; a plan with
    /// zero tasks is not.
    pub fn from_plan(plan: Option<&Plan>) -> Result<Self> {
        let plan = plan.ok_or(PlandagError::NilPlan)?;

        let mut order = Vec::with_capacity(plan.len());
        let mut nodes: HashMap<TaskId, TaskNode> = HashMap::with_capacity(plan.len());

        // First pass: one node per task id.
        for task in &plan.tasks {
            if nodes.contains_key(&task.id) {
                warn!(task = %task.id, "duplicate task id in plan; keeping the first definition");
                continue;
            }
            order.push(task.id.clone());
            nodes.insert(
                task.id.clone(),
                TaskNode {
                    task: task.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: reverse edges, walked in plan order so dependents
        // lists are deterministic.
        let mut dangling: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for id in &order {
            let deps = nodes
                .get(id)
                .map(|n| n.task.inputs.clone())
                .unwrap_or_default();

            for dep in deps {
                match nodes.get_mut(&dep) {
                    Some(dep_node) => dep_node.dependents.push(id.clone()),
                    None => dangling.entry(dep).or_default().push(id.clone()),
                }
            }
        }

        Ok(Self {
            order,
            nodes,
            dangling,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.nodes.get(id).map(|n| &n.task)
    }

    /// Task ids in plan order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Tasks in plan order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.task(id))
    }

    /// Immediate dependencies of a task (its `inputs`).
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.task.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Dependency ids that do not name any task, with the tasks that
    /// reference them.
    pub fn dangling_dependencies(&self) -> &HashMap<TaskId, Vec<TaskId>> {
        &self.dangling
    }

    /// Initial `dependencyCount`: the number of declared inputs per task.
    pub fn dependency_counts(&self) -> HashMap<TaskId, usize> {
        self.nodes
            .iter()
            .map(|(id, n)| (id.clone(), n.task.inputs.len()))
            .collect()
    }

    /// Tasks with no inputs, in plan order.
    pub fn initial_ready(&self) -> Vec<TaskId> {
        self.tasks()
            .filter(|t| t.inputs.is_empty())
            .map(|t| t.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, inputs: &[&str]) -> Task {
        let mut t = Task::new(id, format!("do {id}"), "done");
        t.inputs = inputs.iter().map(|s| s.to_string()).collect();
        t
    }

    #[test]
    fn absent_plan_is_rejected() {
        assert!(matches!(TaskGraph::from_plan(None), Err(PlandagError::NilPlan)));
    }

    #[test]
    fn counts_dependents_and_roots_follow_plan_order() {
        let plan = Plan::new(
            "g",
            vec![
                task("task-003", &["task-001", "task-002"]),
                task("task-002", &[]),
                task("task-004", &["task-001"]),
                task("task-001", &[]),
            ],
        );
        let graph = TaskGraph::from_plan(Some(&plan)).unwrap();

        assert_eq!(graph.initial_ready(), vec!["task-002", "task-001"]);
        assert_eq!(graph.dependency_counts()["task-003"], 2);
        assert_eq!(graph.dependency_counts()["task-001"], 0);
        assert_eq!(graph.dependents_of("task-001"), ["task-003", "task-004"]);
        assert!(graph.dependents_of("task-004").is_empty());
    }

    #[test]
    fn unknown_dependencies_are_recorded_as_dangling() {
        let plan = Plan::new("g", vec![task("task-001", &["task-404"])]);
        let graph = TaskGraph::from_plan(Some(&plan)).unwrap();

        assert!(graph.initial_ready().is_empty());
        assert_eq!(graph.dangling_dependencies()["task-404"], vec!["task-001"]);
    }
}
