// src/exec/mod.rs

//! Task execution layer.
//!
//! This module is responsible for turning a scheduled task into a
//! [`TaskResult`](crate::engine::TaskResult) by talking to the worker
//! capability.
//!
//! - [`backend`] provides the `WorkerBackend` trait and the explicit
//!   `WorkerOutcome` a worker reports.
//! - [`dispatcher`] composes the worker payload and normalizes outcomes,
//!   including the degraded budget-exceeded path.
//! - [`command`] contains process-backed worker, planner and consolidator
//!   implementations used by the CLI; tests substitute fakes.

pub mod backend;
pub mod command;
pub mod dispatcher;

pub use backend::{WorkerBackend, WorkerOutcome};
pub use command::{CommandConsolidator, CommandPlanner, CommandWorker};
pub use dispatcher::{Dispatcher, build_payload};
