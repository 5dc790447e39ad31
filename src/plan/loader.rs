// src/plan/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::{PlandagError, Result};
use crate::plan::model::Plan;
use crate::plan::validate::validate_plan;
use crate::types::PlanFormat;

/// Load a plan file without structural validation.
///
/// `.toml` files are parsed as TOML, everything else as JSON. A JSON
/// document that is `null` (or empty) yields [`PlandagError::NilPlan`].
pub fn load_plan(path: impl AsRef<Path>) -> Result<Plan> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let plan = match PlanFormat::from_path(path) {
        PlanFormat::Toml => Some(toml::from_str::<Plan>(&contents)?),
        PlanFormat::Json => parse_plan_json(&contents)?,
    };

    let plan = plan.ok_or(PlandagError::NilPlan)?;
    debug!(path = %path.display(), tasks = plan.len(), "loaded plan file");
    Ok(plan)
}

/// Parse a JSON plan. `Ok(None)` means the document was absent (`null` or
/// blank), which is distinct from a plan with zero tasks.
pub fn parse_plan_json(contents: &str) -> Result<Option<Plan>> {
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let plan: Option<Plan> = serde_json::from_str(contents)?;
    Ok(plan)
}

/// Load a plan file and reject structurally broken plans.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Plan> {
    let plan = load_plan(path)?;
    validate_plan(&plan)?;
    Ok(plan)
}
