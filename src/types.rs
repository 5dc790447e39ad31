use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Canonical task id type (`task-001`, `task-002`, ...).
pub type TaskId = String;

/// Overall verdict a consolidator reaches about a run.
///
/// - `Success`: the goal was fully met from the task results.
/// - `Partial`: some useful output, but tasks failed or came up short.
/// - `Failed`: the results could not be turned into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(RunStatus::Success),
            "partial" => Ok(RunStatus::Partial),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!(
                "invalid run status: {other} (expected \"success\", \"partial\" or \"failed\")"
            )),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Format a plan file is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Toml,
}

impl PlanFormat {
    /// Guess the format from a file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => PlanFormat::Toml,
            _ => PlanFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn run_status_parses_case_insensitively() {
        assert_eq!("Partial".parse::<RunStatus>(), Ok(RunStatus::Partial));
        assert!("done".parse::<RunStatus>().is_err());
    }

    #[test]
    fn plan_format_defaults_to_json() {
        assert_eq!(PlanFormat::from_path(Path::new("plan.TOML")), PlanFormat::Toml);
        assert_eq!(PlanFormat::from_path(Path::new("plan.json")), PlanFormat::Json);
        assert_eq!(PlanFormat::from_path(Path::new("plan")), PlanFormat::Json);
    }
}
