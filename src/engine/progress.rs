// src/engine/progress.rs

//! Fire-and-forget progress events for outside observers.

use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use crate::types::TaskId;

/// One human-readable progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Announces how many tasks the run will execute.
    Planned { tasks: usize },
    /// A new round of ready tasks is being dispatched.
    RoundStarted { round: usize, tasks: Vec<TaskId> },
    TaskStarted { task: TaskId },
    TaskCompleted { task: TaskId },
    /// The task finished with an error, either recorded in its result or
    /// fatal to the run.
    TaskFailed { task: TaskId, error: String },
    /// End of stream.
    Finished,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Planned { tasks } => {
                write!(f, "There are {tasks} tasks in the plan.")
            }
            ProgressEvent::RoundStarted { round, tasks } => {
                write!(f, "round {round}: dispatching {}", tasks.join(", "))
            }
            ProgressEvent::TaskStarted { task } => write!(f, "running {task}"),
            ProgressEvent::TaskCompleted { task } => write!(f, "completed {task}"),
            ProgressEvent::TaskFailed { task, error } => write!(f, "failed {task}: {error}"),
            ProgressEvent::Finished => write!(f, "done"),
        }
    }
}

/// Sending half of the progress stream.
///
/// Delivery is best effort: when the buffer is full or the receiver is gone
/// the event is dropped, so a slow consumer never stalls dispatch. A
/// disabled sink discards everything.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSink {
    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A buffered sink plus the receiver observers read from.
    ///
    /// A capacity of zero is bumped to one.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn emit(&self, event: ProgressEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(%event, "progress buffer full; dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                trace!(%event, "progress receiver gone; dropping event");
            }
        }
    }
}
