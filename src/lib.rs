// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod plan;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, resolve_config};
use crate::dag::{Scheduler, TaskGraph};
use crate::engine::{Orchestrator, OrchestratorOptions, ProgressEvent, ProgressSink, RunResult};
use crate::errors::PlandagError;
use crate::exec::{CommandConsolidator, CommandPlanner, CommandWorker};
use crate::pipeline::{request_consolidation, request_plan};
use crate::plan::{Plan, load_plan, validate_plan};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - obtaining a plan (plan file or planner)
/// - orchestrator + worker
/// - optional progress printing
/// - optional consolidation
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(args.config.as_deref().map(Path::new))?;

    let plan = obtain_plan(&args, &cfg).await?;
    validate_plan(&plan)?;

    if args.dry_run {
        print_dry_run(&plan)?;
        return Ok(());
    }

    let worker_cfg = cfg.worker.as_ref().ok_or_else(|| {
        PlandagError::ConfigError("executing a plan requires a [worker] section".to_string())
    })?;
    let worker = Arc::new(CommandWorker::from_config(worker_cfg));

    let mut orchestrator =
        Orchestrator::new(worker).with_options(OrchestratorOptions::from(&cfg.orchestrator));

    let printer = if args.progress {
        let (sink, rx) = ProgressSink::channel(cfg.orchestrator.progress_buffer);
        orchestrator = orchestrator.with_progress(sink);
        Some(tokio::spawn(print_progress(rx)))
    } else {
        None
    };

    let outcome = tokio::select! {
        res = orchestrator.execute(&plan) => res.map_err(anyhow::Error::from),
        sig = tokio::signal::ctrl_c() => match sig {
            Ok(()) => Err(anyhow!("interrupted by Ctrl+C")),
            Err(e) => Err(anyhow!("failed to listen for Ctrl+C: {e}")),
        },
    };

    // Dropping the orchestrator closes the progress channel so the printer
    // can drain and finish.
    drop(orchestrator);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    let run = outcome?;
    report(&cfg, &plan, &run).await
}

async fn obtain_plan(args: &CliArgs, cfg: &ConfigFile) -> Result<Plan> {
    if let Some(path) = &args.plan {
        return load_plan(path).with_context(|| format!("loading plan file {path}"));
    }

    let goal = args
        .goal
        .as_deref()
        .ok_or_else(|| PlandagError::ConfigError("either --plan or --goal is required".to_string()))?;
    let planner_cfg = cfg.planner.as_ref().ok_or_else(|| {
        PlandagError::ConfigError("--goal requires a [planner] section".to_string())
    })?;

    let planner = CommandPlanner::from_config(planner_cfg);
    Ok(request_plan(&planner, goal).await?)
}

async fn report(cfg: &ConfigFile, plan: &Plan, run: &RunResult) -> Result<()> {
    let Some(consolidator_cfg) = &cfg.consolidator else {
        debug!("no consolidator configured; printing raw run result");
        println!("{}", serde_json::to_string_pretty(run)?);
        return Ok(());
    };

    let consolidator = CommandConsolidator::from_config(consolidator_cfg);
    let consolidation = request_consolidation(&consolidator, plan, run).await?;

    println!("Status: {}", consolidation.status);
    println!();
    println!("Final Output:");
    println!("{}", consolidation.final_output);
    if let Some(reasoning) = &consolidation.reasoning {
        println!();
        println!("Reasoning: {reasoning}");
    }
    Ok(())
}

async fn print_progress(mut rx: mpsc::Receiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        eprintln!("{event}");
        if event == ProgressEvent::Finished {
            break;
        }
    }
}

/// Dry-run output: tasks, dependencies and the rounds they would run in.
fn print_dry_run(plan: &Plan) -> Result<()> {
    let graph = TaskGraph::from_plan(Some(plan))?;

    println!("plandag dry-run");
    println!("  goal: {}", plan.goal);
    println!();

    println!("tasks ({}):", graph.len());
    for task in graph.tasks() {
        println!("  - {}", task.id);
        println!("      instructions: {}", task.instructions);
        if !task.inputs.is_empty() {
            println!("      inputs: {:?}", task.inputs);
        }
        if let Some(notes) = &task.notes {
            println!("      notes: {notes}");
        }
    }

    let rounds = Scheduler::preview_rounds(&graph);
    println!();
    println!("rounds ({}):", rounds.len());
    for (i, batch) in rounds.iter().enumerate() {
        println!("  {}: {}", i + 1, batch.join(", "));
    }

    info!(rounds = rounds.len(), "dry-run complete (no dispatch)");
    Ok(())
}
