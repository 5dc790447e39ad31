// src/config/validate.rs

use crate::config::model::{CommandSection, ConfigFile, RawConfigFile};
use crate::errors::{PlandagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PlandagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_orchestrator(cfg)?;
    validate_worker(cfg)?;
    validate_command("planner", cfg.planner.as_ref())?;
    validate_command("consolidator", cfg.consolidator.as_ref())?;
    Ok(())
}

fn validate_orchestrator(cfg: &RawConfigFile) -> Result<()> {
    if cfg.orchestrator.progress_buffer == 0 {
        return Err(PlandagError::ConfigError(
            "[orchestrator].progress_buffer must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_worker(cfg: &RawConfigFile) -> Result<()> {
    let Some(worker) = &cfg.worker else {
        return Ok(());
    };

    if worker.cmd.trim().is_empty() {
        return Err(PlandagError::ConfigError(
            "[worker].cmd must not be empty".to_string(),
        ));
    }
    if worker.budget_exceeded_exit_code == 0 {
        return Err(PlandagError::ConfigError(
            "[worker].budget_exceeded_exit_code must not be 0 (0 means success)".to_string(),
        ));
    }
    Ok(())
}

fn validate_command(section: &str, cmd: Option<&CommandSection>) -> Result<()> {
    match cmd {
        Some(c) if c.cmd.trim().is_empty() => Err(PlandagError::ConfigError(format!(
            "[{section}].cmd must not be empty"
        ))),
        _ => Ok(()),
    }
}
