// src/dag/scheduler.rs

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use tracing::{debug, info};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::errors::{PlandagError, Result};
use crate::types::TaskId;

/// Lifecycle of a single run.
///
/// `Running` and `Draining` are the same loop seen from two angles: either
/// there are queued ready tasks nobody has picked up yet, or everything
/// queued is in flight and we are waiting for completions to unlock more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Building,
    Running,
    Draining,
    Done,
}

/// Scheduler holds the immutable task graph plus the mutable ready-set state.
///
/// It is responsible for:
/// - handing out the ready queue as one batch per round
/// - decrementing dependency counts as tasks complete
/// - queueing dependents whose count reaches zero
/// - refusing a second completion for the same task
///
/// It owns `dependencyCount`, `dependents` (via the graph) and `ready`
/// exclusively; callers must funnel every completion through
/// [`Scheduler::complete`].
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    dependency_count: HashMap<TaskId, usize>,
    ready: Vec<TaskId>,
    in_flight: HashSet<TaskId>,
    completed: HashSet<TaskId>,
    phase: SchedulerPhase,
    /// Number of non-empty batches handed out so far.
    round: usize,
}

impl Scheduler {
    /// Build scheduling state from a graph. The initial ready queue is every
    /// task without inputs, in plan order.
    pub fn new(graph: TaskGraph) -> Self {
        let dependency_count = graph.dependency_counts();
        let ready = graph.initial_ready();

        debug!(
            tasks = graph.len(),
            initial_ready = ready.len(),
            "scheduler: built scheduling state"
        );

        Self {
            graph,
            dependency_count,
            ready,
            in_flight: HashSet::new(),
            completed: HashSet::new(),
            phase: SchedulerPhase::Building,
            round: 0,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == SchedulerPhase::Done
    }

    /// Number of batches handed out so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Tasks queued for the next round, in queue order.
    pub fn ready(&self) -> &[TaskId] {
        &self.ready
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Remaining unresolved dependency count for a task.
    pub fn remaining_dependencies(&self, id: &str) -> Option<usize> {
        self.dependency_count.get(id).copied()
    }

    /// Snapshot the ready queue into a batch and clear it.
    ///
    /// Every id in the returned batch is now in flight. An empty batch with
    /// nothing in flight moves the scheduler to `Done`.
    pub fn next_batch(&mut self) -> Vec<TaskId> {
        let batch = std::mem::take(&mut self.ready);

        if batch.is_empty() {
            if self.in_flight.is_empty() {
                if self.phase != SchedulerPhase::Done {
                    info!(
                        rounds = self.round,
                        completed = self.completed.len(),
                        total = self.graph.len(),
                        "scheduler: no ready tasks left; run is done"
                    );
                }
                self.phase = SchedulerPhase::Done;
            }
            return batch;
        }

        self.round += 1;
        for id in &batch {
            self.in_flight.insert(id.clone());
        }
        self.phase = SchedulerPhase::Draining;

        debug!(
            round = self.round,
            batch_size = batch.len(),
            ?batch,
            "scheduler: handing out ready batch"
        );

        batch
    }

    /// Record that a dispatched task has a committed result and unlock its
    /// dependents.
    pub fn complete(&mut self, id: &str) -> Result<SchedulerStep> {
        if !self.in_flight.remove(id) {
            if self.completed.contains(id) {
                return Err(PlandagError::DuplicateResult(id.to_string()));
            }
            return Err(PlandagError::Other(anyhow!(
                "completion reported for task '{id}', which was never dispatched"
            )));
        }
        self.completed.insert(id.to_string());

        let mut newly_ready = Vec::new();
        for dependent in self.graph.dependents_of(id) {
            let Some(count) = self.dependency_count.get_mut(dependent) else {
                continue;
            };
            *count = count.saturating_sub(1);
            if *count == 0 {
                debug!(task = %dependent, unlocked_by = %id, "dependencies resolved; queued for next round");
                self.ready.push(dependent.clone());
                newly_ready.push(dependent.clone());
            }
        }

        if !self.ready.is_empty() {
            self.phase = SchedulerPhase::Running;
        }

        Ok(SchedulerStep {
            newly_ready,
            run_just_finished: self.in_flight.is_empty() && self.ready.is_empty(),
        })
    }

    /// Tasks that have not completed, in plan order.
    ///
    /// After `Done` this is non-empty only when some tasks could never
    /// become ready (a cycle, or an input naming no task).
    pub fn unfinished(&self) -> Vec<TaskId> {
        self.graph
            .task_ids()
            .filter(|id| !self.completed.contains(*id))
            .map(|s| s.to_string())
            .collect()
    }

    /// Predict the round-by-round batches for a graph, assuming every task
    /// in a round completes before the next round starts.
    pub fn preview_rounds(graph: &TaskGraph) -> Vec<Vec<TaskId>> {
        let mut scheduler = Scheduler::new(graph.clone());
        let mut rounds = Vec::new();

        loop {
            let batch = scheduler.next_batch();
            if batch.is_empty() {
                break;
            }
            for id in &batch {
                // Ids come straight out of `next_batch`, so this cannot fail.
                let _ = scheduler.complete(id);
            }
            rounds.push(batch);
        }

        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Plan, Task};

    fn task(id: &str, inputs: &[&str]) -> Task {
        let mut t = Task::new(id, format!("do {id}"), "done");
        t.inputs = inputs.iter().map(|s| s.to_string()).collect();
        t
    }

    fn scheduler_for(tasks: Vec<Task>) -> Scheduler {
        let plan = Plan::new("g", tasks);
        Scheduler::new(TaskGraph::from_plan(Some(&plan)).unwrap())
    }

    #[test]
    fn independent_tasks_share_first_round() {
        let mut s = scheduler_for(vec![
            task("A", &[]),
            task("B", &["A"]),
            task("C", &[]),
        ]);
        assert_eq!(s.phase(), SchedulerPhase::Building);

        assert_eq!(s.next_batch(), vec!["A", "C"]);
        assert_eq!(s.phase(), SchedulerPhase::Draining);

        let step = s.complete("C").unwrap();
        assert!(step.newly_ready.is_empty());
        assert!(!step.run_just_finished);

        let step = s.complete("A").unwrap();
        assert_eq!(step.newly_ready, vec!["B"]);
        assert_eq!(s.phase(), SchedulerPhase::Running);

        assert_eq!(s.next_batch(), vec!["B"]);
        let step = s.complete("B").unwrap();
        assert!(step.run_just_finished);

        assert!(s.next_batch().is_empty());
        assert!(s.is_done());
        assert_eq!(s.round(), 2);
        assert!(s.unfinished().is_empty());
    }

    #[test]
    fn dependent_waits_for_every_input() {
        let mut s = scheduler_for(vec![
            task("A", &[]),
            task("B", &[]),
            task("C", &["A", "B"]),
        ]);
        s.next_batch();

        assert!(s.complete("A").unwrap().newly_ready.is_empty());
        assert_eq!(s.remaining_dependencies("C"), Some(1));
        assert_eq!(s.complete("B").unwrap().newly_ready, vec!["C"]);
    }

    #[test]
    fn second_completion_is_a_duplicate() {
        let mut s = scheduler_for(vec![task("A", &[])]);
        s.next_batch();
        s.complete("A").unwrap();

        assert!(matches!(
            s.complete("A"),
            Err(PlandagError::DuplicateResult(id)) if id == "A"
        ));
    }

    #[test]
    fn completion_before_dispatch_is_rejected() {
        let mut s = scheduler_for(vec![task("A", &[]), task("B", &["A"])]);
        assert!(s.complete("B").is_err());
    }

    #[test]
    fn cycle_stalls_with_unfinished_tasks() {
        let mut s = scheduler_for(vec![
            task("A", &[]),
            task("X", &["Y"]),
            task("Y", &["X"]),
        ]);
        assert_eq!(s.next_batch(), vec!["A"]);
        s.complete("A").unwrap();

        assert!(s.next_batch().is_empty());
        assert!(s.is_done());
        assert_eq!(s.unfinished(), vec!["X", "Y"]);
    }

    #[test]
    fn empty_graph_is_done_immediately() {
        let mut s = scheduler_for(Vec::new());
        assert!(s.next_batch().is_empty());
        assert!(s.is_done());
        assert_eq!(s.round(), 0);
    }

    #[test]
    fn preview_rounds_groups_by_depth() {
        let plan = Plan::new(
            "g",
            vec![
                task("A", &[]),
                task("B", &["A"]),
                task("C", &[]),
                task("D", &["B", "C"]),
            ],
        );
        let graph = TaskGraph::from_plan(Some(&plan)).unwrap();
        assert_eq!(
            Scheduler::preview_rounds(&graph),
            vec![vec!["A", "C"], vec!["B"], vec!["D"]]
        );
    }
}
