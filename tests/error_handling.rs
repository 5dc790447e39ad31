// tests/error_handling.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use plandag::config::{ConfigFile, load_and_validate as load_config, resolve_config};
use plandag::errors::PlandagError;
use plandag::plan::{load_and_validate, load_plan};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn null_plan_file_is_nil_plan() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(&dir, "plan.json", "null\n");

    assert!(matches!(load_plan(&path), Err(PlandagError::NilPlan)));
    Ok(())
}

#[test]
fn json_plan_with_plan_key_loads() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "plan.json",
        r#"{
            "goal": "compare two libraries",
            "plan": [
                {"id": "task-001", "instructions": "read docs for A", "success_criteria": "notes on A"},
                {"id": "task-002", "instructions": "read docs for B", "success_criteria": "notes on B"},
                {"id": "task-003", "instructions": "compare", "success_criteria": "a table",
                 "inputs": ["task-001", "task-002"], "notes": "keep it short"}
            ]
        }"#,
    );

    let plan = load_and_validate(&path)?;
    assert_eq!(plan.goal, "compare two libraries");
    assert_eq!(plan.len(), 3);
    let last = plan.task("task-003").unwrap();
    assert_eq!(last.inputs, vec!["task-001", "task-002"]);
    assert_eq!(last.notes.as_deref(), Some("keep it short"));
    Ok(())
}

#[test]
fn toml_plan_loads() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "plan.toml",
        r#"
goal = "write a summary"

[[tasks]]
id = "task-001"
instructions = "collect facts"
success_criteria = "at least three facts"

[[tasks]]
id = "task-002"
instructions = "summarize"
success_criteria = "one paragraph"
inputs = ["task-001"]
"#,
    );

    let plan = load_and_validate(&path)?;
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.tasks[1].inputs, vec!["task-001"]);
    Ok(())
}

#[test]
fn malformed_plan_is_a_parse_error() -> TestResult {
    let dir = TempDir::new()?;
    let json = write(&dir, "plan.json", r#"{"goal": "g", "tasks": [ {"id": 1} ]}"#);
    let toml = write(&dir, "plan.toml", "goal = ");

    assert!(matches!(load_plan(&json), Err(PlandagError::JsonError(_))));
    assert!(matches!(load_plan(&toml), Err(PlandagError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_plan_file_is_an_io_error() -> TestResult {
    let dir = TempDir::new()?;
    let err = load_plan(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PlandagError::IoError(_)));
    Ok(())
}

#[test]
fn structurally_broken_plans_are_rejected_on_load() -> TestResult {
    let dir = TempDir::new()?;
    let duplicate = write(
        &dir,
        "dup.json",
        r#"{"goal": "g", "tasks": [
            {"id": "task-001", "instructions": "a", "success_criteria": "a"},
            {"id": "task-001", "instructions": "b", "success_criteria": "b"}
        ]}"#,
    );
    let cycle = write(
        &dir,
        "cycle.json",
        r#"{"goal": "g", "tasks": [
            {"id": "task-001", "instructions": "a", "success_criteria": "a", "inputs": ["task-002"]},
            {"id": "task-002", "instructions": "b", "success_criteria": "b", "inputs": ["task-001"]}
        ]}"#,
    );
    let dangling = write(
        &dir,
        "dangling.json",
        r#"{"goal": "g", "tasks": [
            {"id": "task-001", "instructions": "a", "success_criteria": "a", "inputs": ["task-042"]}
        ]}"#,
    );

    assert!(matches!(
        load_and_validate(&duplicate),
        Err(PlandagError::DuplicateTask(id)) if id == "task-001"
    ));
    assert!(matches!(
        load_and_validate(&cycle),
        Err(PlandagError::DependencyCycle(_))
    ));
    assert!(matches!(
        load_and_validate(&dangling),
        Err(PlandagError::UnresolvedDependency { task, dependency })
            if task == "task-001" && dependency == "task-042"
    ));
    Ok(())
}

#[test]
fn full_config_loads_with_defaults_filled_in() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "Plandag.toml",
        r#"
[worker]
cmd = "./worker"

[planner]
cmd = "./planner"
"#,
    );

    let cfg: ConfigFile = load_config(&path)?;
    assert_eq!(cfg.orchestrator.progress_buffer, 64);
    assert!(cfg.orchestrator.check_task_ids);
    let worker = cfg.worker.unwrap();
    assert_eq!(worker.cmd, "./worker");
    assert_eq!(worker.budget_exceeded_exit_code, 3);
    assert_eq!(cfg.planner.unwrap().cmd, "./planner");
    assert!(cfg.consolidator.is_none());
    Ok(())
}

#[test]
fn invalid_config_values_are_config_errors() -> TestResult {
    let dir = TempDir::new()?;
    let cases = [
        "[orchestrator]\nprogress_buffer = 0\n",
        "[worker]\ncmd = \"  \"\n",
        "[worker]\ncmd = \"./w\"\nbudget_exceeded_exit_code = 0\n",
        "[consolidator]\ncmd = \"\"\n",
    ];

    for (i, contents) in cases.iter().enumerate() {
        let path = write(&dir, &format!("bad-{i}.toml"), contents);
        let err = load_config(&path).unwrap_err();
        assert!(
            matches!(err, PlandagError::ConfigError(_)),
            "case {i} should be a config error, got {err:?}"
        );
    }
    Ok(())
}

#[test]
fn explicit_config_path_must_exist() -> TestResult {
    let dir = TempDir::new()?;
    let missing = dir.path().join("missing.toml");

    let err = resolve_config(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, PlandagError::ConfigError(msg) if msg.contains("does not exist")));
    Ok(())
}
