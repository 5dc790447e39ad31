// src/pipeline.rs

//! End-to-end plan → orchestrate → consolidate pipeline.
//!
//! The planner and consolidator are external capabilities; this module only
//! defines their contracts and how their failures surface.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{Orchestrator, RunResult};
use crate::errors::{PlandagError, Result};
use crate::plan::Plan;
use crate::types::RunStatus;

/// Final synthesized answer for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consolidation {
    pub status: RunStatus,
    #[serde(default)]
    pub final_output: String,
    /// Why the status is `partial` or `failed`, if given.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Produces a plan for a goal. `Ok(None)` means no structured plan came back.
pub trait Planner: Send + Sync {
    fn plan<'a>(
        &'a self,
        goal: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Plan>>> + Send + 'a>>;
}

/// Synthesizes a final answer from a plan and its results. `Ok(None)` means
/// nothing usable came back.
pub trait Consolidator: Send + Sync {
    fn consolidate<'a>(
        &'a self,
        plan: &'a Plan,
        run: &'a RunResult,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Consolidation>>> + Send + 'a>>;
}

/// Ask the planner for a plan, turning every kind of miss into
/// [`PlandagError::PlanningFailure`].
pub async fn request_plan(planner: &dyn Planner, goal: &str) -> Result<Plan> {
    match planner.plan(goal).await {
        Ok(Some(plan)) => {
            info!(tasks = plan.len(), goal = %plan.goal, "planner produced a plan");
            Ok(plan)
        }
        Ok(None) => Err(PlandagError::PlanningFailure(
            "planner returned no structured plan".to_string(),
        )),
        Err(err) => Err(PlandagError::PlanningFailure(format!("{err:#}"))),
    }
}

/// Ask the consolidator for the final answer, turning every kind of miss
/// into [`PlandagError::ConsolidationFailure`].
pub async fn request_consolidation(
    consolidator: &dyn Consolidator,
    plan: &Plan,
    run: &RunResult,
) -> Result<Consolidation> {
    match consolidator.consolidate(plan, run).await {
        Ok(Some(consolidation)) => {
            info!(status = %consolidation.status, "consolidator produced a final answer");
            Ok(consolidation)
        }
        Ok(None) => Err(PlandagError::ConsolidationFailure(
            "consolidator returned nothing usable".to_string(),
        )),
        Err(err) => Err(PlandagError::ConsolidationFailure(format!("{err:#}"))),
    }
}

/// Planner, orchestrator and consolidator wired together.
pub struct Pipeline {
    planner: Arc<dyn Planner>,
    orchestrator: Orchestrator,
    consolidator: Arc<dyn Consolidator>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        planner: Arc<dyn Planner>,
        orchestrator: Orchestrator,
        consolidator: Arc<dyn Consolidator>,
    ) -> Self {
        Self {
            planner,
            orchestrator,
            consolidator,
        }
    }

    /// Plan, execute and consolidate one goal. Any stage failing aborts the
    /// pipeline.
    pub async fn run(&self, goal: &str) -> Result<Consolidation> {
        let plan = request_plan(self.planner.as_ref(), goal).await?;
        let run = self.orchestrator.execute(&plan).await?;
        request_consolidation(self.consolidator.as_ref(), &plan, &run).await
    }
}
