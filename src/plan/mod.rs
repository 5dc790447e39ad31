// src/plan/mod.rs

//! Plan data model, loading and structural validation.
//!
//! - [`model`] defines the serde-backed `Plan` / `Task` types.
//! - [`loader`] reads a plan from a JSON or TOML file.
//! - [`validate`] checks structural invariants (unique ids, known
//!   dependencies, acyclicity) before anything is scheduled.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_plan, parse_plan_json};
pub use model::{Plan, Task};
pub use validate::{nonconforming_task_ids, validate_plan};
