// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::OrchestratorSection;
use crate::dag::{Scheduler, TaskGraph};
use crate::engine::accumulator::ResultAccumulator;
use crate::engine::progress::{ProgressEvent, ProgressSink};
use crate::engine::{RunResult, TaskResult};
use crate::errors::{PlandagError, Result};
use crate::exec::{Dispatcher, WorkerBackend};
use crate::plan::validate::ensure_unique_ids;
use crate::plan::{Plan, nonconforming_task_ids, validate_plan};
use crate::types::TaskId;

/// Error reported for tasks cut short because a sibling failed the run.
pub const ABORTED_ERROR: &str = "aborted: run failed";

/// Knobs for a single orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// Validate ids, dependency references and acyclicity before running.
    pub validate: bool,
    /// Warn about ids that break the `task-NNN` convention.
    pub check_task_ids: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            validate: true,
            check_task_ids: true,
        }
    }
}

impl From<&OrchestratorSection> for OrchestratorOptions {
    fn from(section: &OrchestratorSection) -> Self {
        Self {
            validate: true,
            check_task_ids: section.check_task_ids,
        }
    }
}

/// Runs a plan against a worker, round by round.
///
/// Every task in a round is dispatched as its own Tokio task, so dispatches
/// run truly in parallel. Completions come back through a single `JoinSet`
/// owned by the coordinating loop, which is the only place the scheduler and
/// the accumulator are written. There is no bound on round width.
pub struct Orchestrator {
    dispatcher: Dispatcher,
    progress: ProgressSink,
    options: OrchestratorOptions,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("progress", &self.progress)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(worker: Arc<dyn WorkerBackend>) -> Self {
        Self {
            dispatcher: Dispatcher::new(worker),
            progress: ProgressSink::disabled(),
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute a plan that is known to be present.
    pub async fn execute(&self, plan: &Plan) -> Result<RunResult> {
        self.run(Some(plan)).await
    }

    /// Execute a plan to completion.
    ///
    /// - An absent plan fails with [`PlandagError::NilPlan`].
    /// - A plan with zero tasks yields an empty [`RunResult`].
    /// - A worker failure other than budget exhaustion aborts the run; no
    ///   partial result is returned.
    /// - Tasks that can never become ready are reported as an error rather
    ///   than silently left out of the result.
    pub async fn run(&self, plan: Option<&Plan>) -> Result<RunResult> {
        let plan = plan.ok_or(PlandagError::NilPlan)?;

        if self.options.validate {
            validate_plan(plan)?;
        }
        if self.options.check_task_ids {
            let odd = nonconforming_task_ids(plan);
            if !odd.is_empty() {
                warn!(?odd, "task ids do not follow the task-NNN convention");
            }
        }

        let graph = TaskGraph::from_plan(Some(plan))?;
        if graph.len() != plan.len() {
            // The graph kept only the first definition of a repeated id.
            ensure_unique_ids(plan)?;
        }

        info!(goal = %plan.goal, tasks = graph.len(), "orchestrating plan");
        self.progress.emit(ProgressEvent::Planned { tasks: graph.len() });

        let outcome = self.drive(graph).await;
        self.progress.emit(ProgressEvent::Finished);

        match &outcome {
            Ok(run) => info!(
                results = run.len(),
                failed = run.failed().count(),
                "run complete"
            ),
            Err(err) => error!(error = %err, "run aborted"),
        }
        outcome
    }

    async fn drive(&self, graph: TaskGraph) -> Result<RunResult> {
        let mut scheduler = Scheduler::new(graph);
        let results = ResultAccumulator::new();

        loop {
            let batch = scheduler.next_batch();
            if batch.is_empty() {
                break;
            }

            self.progress.emit(ProgressEvent::RoundStarted {
                round: scheduler.round(),
                tasks: batch.clone(),
            });
            self.run_round(&mut scheduler, &results, batch).await?;
        }

        let unfinished = scheduler.unfinished();
        if !unfinished.is_empty() {
            return Err(self.stall_error(&scheduler, unfinished));
        }

        Ok(results.to_run_result())
    }

    /// Dispatch one batch and wait for all of it (the round barrier).
    async fn run_round(
        &self,
        scheduler: &mut Scheduler,
        results: &ResultAccumulator,
        batch: Vec<TaskId>,
    ) -> Result<()> {
        let round = scheduler.round();
        let mut in_flight: JoinSet<(TaskId, Result<TaskResult>)> = JoinSet::new();
        let mut pending = batch.clone();

        for id in batch {
            let task = scheduler
                .graph()
                .task(&id)
                .cloned()
                .ok_or_else(|| PlandagError::Other(anyhow!("task '{id}' missing from graph")))?;
            let inputs = results.resolve_inputs(&task)?;

            debug!(task = %id, round, inputs = inputs.len(), "dispatching task");
            self.progress.emit(ProgressEvent::TaskStarted { task: id.clone() });

            let dispatcher = self.dispatcher.clone();
            in_flight.spawn(async move {
                let outcome = dispatcher.dispatch(&task, &inputs).await;
                (task.id, outcome)
            });
        }

        // Completions arrive in whatever order the worker finishes them.
        // Returning early drops the JoinSet, which aborts the siblings.
        while let Some(joined) = in_flight.join_next().await {
            let (id, outcome) = joined.map_err(|e| {
                PlandagError::Other(anyhow!("dispatch task did not finish: {e}"))
            })?;
            pending.retain(|p| p != &id);

            let result = match outcome {
                Ok(result) => result,
                Err(err) => {
                    self.progress.emit(ProgressEvent::TaskFailed {
                        task: id,
                        error: err.to_string(),
                    });
                    // Siblings still running are aborted with the JoinSet.
                    for task in pending {
                        debug!(task = %task, round, "aborting in-flight task");
                        self.progress.emit(ProgressEvent::TaskFailed {
                            task,
                            error: ABORTED_ERROR.to_string(),
                        });
                    }
                    return Err(err);
                }
            };

            let event = match &result.error {
                Some(error) => ProgressEvent::TaskFailed {
                    task: id.clone(),
                    error: error.clone(),
                },
                None => ProgressEvent::TaskCompleted { task: id.clone() },
            };

            results.record(result)?;
            let step = scheduler.complete(&id)?;
            self.progress.emit(event);

            debug!(
                task = %id,
                round,
                unlocked = ?step.newly_ready,
                run_finished = step.run_just_finished,
                "task result committed"
            );
        }

        Ok(())
    }

    fn stall_error(&self, scheduler: &Scheduler, unfinished: Vec<TaskId>) -> PlandagError {
        let graph = scheduler.graph();

        // An input naming no task explains the stall more precisely than a
        // cycle does.
        let dangling = graph.dangling_dependencies();
        for id in &unfinished {
            for dep in graph.dependencies_of(id) {
                if dangling.contains_key(dep) {
                    return PlandagError::UnresolvedDependency {
                        task: id.clone(),
                        dependency: dep.clone(),
                    };
                }
            }
        }

        warn!(?unfinished, "tasks never became ready");
        PlandagError::IncompleteRun {
            missing: unfinished,
        }
    }
}
