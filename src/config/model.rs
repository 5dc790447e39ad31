// src/config/model.rs

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [orchestrator]
/// progress_buffer = 64
/// check_task_ids = true
///
/// [worker]
/// cmd = "./bin/worker"
/// budget_exceeded_exit_code = 3
///
/// [planner]
/// cmd = "./bin/planner"
///
/// [consolidator]
/// cmd = "./bin/consolidator"
/// ```
///
/// All sections are optional. A worker is only needed to execute a plan, a
/// planner only for `--goal`, and without a consolidator the raw run result
/// is printed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub orchestrator: OrchestratorSection,

    #[serde(default)]
    pub worker: Option<WorkerSection>,

    #[serde(default)]
    pub planner: Option<CommandSection>,

    #[serde(default)]
    pub consolidator: Option<CommandSection>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub orchestrator: OrchestratorSection,
    pub worker: Option<WorkerSection>,
    pub planner: Option<CommandSection>,
    pub consolidator: Option<CommandSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            orchestrator: raw.orchestrator,
            worker: raw.worker,
            planner: raw.planner,
            consolidator: raw.consolidator,
        }
    }
}

/// `[orchestrator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// Capacity of the progress event buffer. Events beyond it are dropped
    /// rather than slowing dispatch down.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,

    /// Warn about task ids that are not of the form `task-NNN`.
    #[serde(default = "default_check_task_ids")]
    pub check_task_ids: bool,
}

fn default_progress_buffer() -> usize {
    64
}

fn default_check_task_ids() -> bool {
    true
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            progress_buffer: default_progress_buffer(),
            check_task_ids: default_check_task_ids(),
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Shell command that executes one task payload.
    pub cmd: String,

    /// Exit code the worker uses to say it ran out of interaction steps.
    #[serde(default = "default_budget_exceeded_exit_code")]
    pub budget_exceeded_exit_code: i32,
}

fn default_budget_exceeded_exit_code() -> i32 {
    3
}

/// `[planner]` / `[consolidator]` sections.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    pub cmd: String,
}
