// src/dag/scheduler_step.rs

//! Step-by-step result types for the scheduler.

use crate::types::TaskId;

/// Structured result of recording one task completion.
///
/// Tests use this to step the scheduler by hand and assert on exactly what
/// a completion unlocked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Dependents whose last outstanding dependency was this task. They are
    /// queued for the *next* round, not dispatched immediately.
    pub newly_ready: Vec<TaskId>,
    /// Whether nothing is in flight and nothing is queued after this step.
    pub run_just_finished: bool,
}
