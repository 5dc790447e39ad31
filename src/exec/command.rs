// src/exec/command.rs

//! Process-backed capabilities.
//!
//! Each capability is an external command run through the platform shell.
//! The request goes to the child's stdin and the answer is read from its
//! stdout; stderr is only logged.
//!
//! - worker: payload in, `TaskResult` JSON (or plain text) out. Exiting
//!   with the configured budget code signals budget exhaustion.
//! - planner: `User Goal: <goal>` in, plan JSON out.
//! - consolidator: `{"plan": …, "results": …}` JSON in, consolidation
//!   JSON out.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::{CommandSection, WorkerSection};
use crate::engine::{RunResult, TaskResult};
use crate::exec::backend::{WorkerBackend, WorkerOutcome};
use crate::pipeline::{Consolidation, Consolidator, Planner};
use crate::plan::{Plan, parse_plan_json};

/// Captured result of one capability process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run `cmd` through the shell, feed it `input` on stdin and collect its
/// output.
pub async fn run_command(cmd: &str, input: &str) -> Result<CommandOutput> {
    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning capability process '{cmd}'"))?;

    // Write stdin from its own task so a child that talks before it has read
    // everything cannot deadlock against us.
    if let Some(mut stdin) = child.stdin.take() {
        let input = input.to_owned();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(error = %e, "capability process closed stdin early");
            }
            // stdin is dropped here, signalling EOF.
        });
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for capability process '{cmd}'"))?;

    let result = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    for line in result.stderr.lines() {
        debug!(cmd = %cmd, "stderr: {}", line);
    }
    debug!(cmd = %cmd, code = ?result.code, stdout_len = result.stdout.len(), "capability process exited");

    Ok(result)
}

fn failure_message(what: &str, output: &CommandOutput) -> String {
    let code = output
        .code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        format!("{what} exited with {code}")
    } else {
        format!("{what} exited with {code}: {stderr}")
    }
}

/// Worker capability backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandWorker {
    cmd: String,
    budget_exceeded_exit_code: i32,
}

impl CommandWorker {
    pub fn new(cmd: impl Into<String>, budget_exceeded_exit_code: i32) -> Self {
        Self {
            cmd: cmd.into(),
            budget_exceeded_exit_code,
        }
    }

    pub fn from_config(section: &WorkerSection) -> Self {
        Self::new(section.cmd.clone(), section.budget_exceeded_exit_code)
    }

    /// Interpret worker stdout: a `TaskResult` JSON object if it parses as
    /// one, otherwise the trimmed text is the output.
    fn parse_result(stdout: &str) -> TaskResult {
        let trimmed = stdout.trim();
        match serde_json::from_str::<TaskResult>(trimmed) {
            Ok(result) => result,
            Err(_) => TaskResult::success(String::new(), trimmed),
        }
    }
}

impl WorkerBackend for CommandWorker {
    fn execute(
        &self,
        payload: String,
    ) -> Pin<Box<dyn Future<Output = Result<WorkerOutcome>> + Send + '_>> {
        Box::pin(async move {
            let output = run_command(&self.cmd, &payload).await?;

            if output.success() {
                return Ok(WorkerOutcome::Completed(Self::parse_result(&output.stdout)));
            }

            if output.code == Some(self.budget_exceeded_exit_code) {
                let partial = Some(output.stdout.trim().to_string()).filter(|s| !s.is_empty());
                return Ok(WorkerOutcome::BudgetExceeded { partial });
            }

            bail!(failure_message("worker command", &output))
        })
    }
}

/// Planner capability backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    cmd: String,
}

impl CommandPlanner {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn from_config(section: &CommandSection) -> Self {
        Self::new(section.cmd.clone())
    }
}

impl Planner for CommandPlanner {
    fn plan<'a>(
        &'a self,
        goal: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Plan>>> + Send + 'a>> {
        Box::pin(async move {
            let output = run_command(&self.cmd, &format!("User Goal: {goal}")).await?;
            if !output.success() {
                bail!(failure_message("planner command", &output));
            }
            let plan = parse_plan_json(&output.stdout).context("parsing planner output")?;
            Ok(plan)
        })
    }
}

/// Consolidator capability backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandConsolidator {
    cmd: String,
}

#[derive(Serialize)]
struct ConsolidationRequest<'a> {
    plan: &'a Plan,
    results: &'a RunResult,
}

impl CommandConsolidator {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn from_config(section: &CommandSection) -> Self {
        Self::new(section.cmd.clone())
    }
}

impl Consolidator for CommandConsolidator {
    fn consolidate<'a>(
        &'a self,
        plan: &'a Plan,
        run: &'a RunResult,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Consolidation>>> + Send + 'a>> {
        Box::pin(async move {
            let request = serde_json::to_string(&ConsolidationRequest { plan, results: run })
                .context("serializing consolidation request")?;

            let output = run_command(&self.cmd, &request).await?;
            if !output.success() {
                bail!(failure_message("consolidator command", &output));
            }

            let stdout = output.stdout.trim();
            if stdout.is_empty() {
                warn!(cmd = %self.cmd, "consolidator produced no output");
                return Ok(None);
            }
            let consolidation: Option<Consolidation> =
                serde_json::from_str(stdout).context("parsing consolidator output")?;
            Ok(consolidation)
        })
    }
}
