// src/dag/mod.rs

//! Task graph and ready-set scheduling.
//!
//! - [`graph`] turns a flat plan into an executable dependency structure.
//! - [`scheduler`] contains the per-run state machine that hands out
//!   ready batches and unlocks dependents as tasks complete.
//! - [`scheduler_step`] defines the result type for a completion step.
//!
//! Nothing in here performs IO or touches Tokio; the async shell lives in
//! [`crate::engine`].

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;

pub use graph::TaskGraph;
pub use scheduler::{Scheduler, SchedulerPhase};
pub use scheduler_step::SchedulerStep;
