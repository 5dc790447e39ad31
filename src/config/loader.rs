// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PlandagError, Result};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Pick the configuration for a run.
///
/// - An explicit path must exist.
/// - Otherwise `Plandag.toml` in the working directory is used if present.
/// - Otherwise all defaults apply (no capabilities configured).
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(PlandagError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!(path = %default_path.display(), "using config file from working directory");
        load_and_validate(&default_path)
    } else {
        debug!("no config file found; using defaults");
        ConfigFile::try_from(RawConfigFile::default())
    }
}

/// Default config location: `Plandag.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Plandag.toml")
}
