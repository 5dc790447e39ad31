// src/plan/validate.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use crate::errors::{PlandagError, Result};
use crate::plan::model::Plan;
use crate::types::TaskId;

static TASK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^task-\d{3}$").expect("task id pattern is a valid regex")
});

/// Check the structural invariants a plan must satisfy before scheduling:
///
/// - task ids are unique,
/// - every `inputs` entry names a task in the plan,
/// - the dependency graph is acyclic.
///
/// Task semantics (instructions, criteria) are not inspected.
pub fn validate_plan(plan: &Plan) -> Result<()> {
    ensure_unique_ids(plan)?;
    validate_task_dependencies(plan)?;
    validate_dag(plan)?;
    Ok(())
}

/// Ids that break the planner's `task-NNN` convention.
///
/// The orchestrator does not reject these; callers may warn.
pub fn nonconforming_task_ids(plan: &Plan) -> Vec<TaskId> {
    plan.tasks
        .iter()
        .filter(|t| !TASK_ID_PATTERN.is_match(&t.id))
        .map(|t| t.id.clone())
        .collect()
}

pub(crate) fn ensure_unique_ids(plan: &Plan) -> Result<()> {
    let mut seen = HashSet::new();
    for task in &plan.tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(PlandagError::DuplicateTask(task.id.clone()));
        }
    }
    Ok(())
}

fn validate_task_dependencies(plan: &Plan) -> Result<()> {
    let ids: HashSet<&str> = plan.tasks.iter().map(|t| t.id.as_str()).collect();

    for task in &plan.tasks {
        for dep in &task.inputs {
            if dep == &task.id {
                return Err(PlandagError::DependencyCycle(format!(
                    "task '{}' depends on itself",
                    task.id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(PlandagError::UnresolvedDependency {
                    task: task.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_dag(plan: &Plan) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in &plan.tasks {
        graph.add_node(task.id.as_str());
    }
    for task in &plan.tasks {
        for dep in &task.inputs {
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            let mut members: Vec<&str> = tarjan_scc(&graph)
                .into_iter()
                .find(|scc| scc.contains(&node))
                .unwrap_or_else(|| vec![node]);
            members.sort_unstable();
            Err(PlandagError::DependencyCycle(format!(
                "tasks [{}] depend on each other",
                members.join(", ")
            )))
        }
    }
}
