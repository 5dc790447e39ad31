// src/exec/backend.rs

//! Pluggable worker abstraction.
//!
//! The orchestrator talks to a `WorkerBackend` instead of a concrete
//! executor, so tests can swap in a scripted fake while production uses
//! [`CommandWorker`](super::CommandWorker).

use std::future::Future;
use std::pin::Pin;

use crate::engine::TaskResult;

/// What a worker reports back for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The worker finished and produced a result.
    Completed(TaskResult),
    /// The worker ran out of interaction steps before finishing. Whatever it
    /// managed to produce is carried along for logging only.
    BudgetExceeded { partial: Option<String> },
}

/// Trait abstracting how a single task payload is executed.
///
/// An `Err` from [`WorkerBackend::execute`] is a hard failure and aborts the
/// whole run; budget exhaustion must be reported as
/// [`WorkerOutcome::BudgetExceeded`] instead.
pub trait WorkerBackend: Send + Sync {
    fn execute(
        &self,
        payload: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<WorkerOutcome>> + Send + '_>>;
}
