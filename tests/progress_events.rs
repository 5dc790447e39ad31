// tests/progress_events.rs

mod common;
use crate::common::builders::{PlanBuilder, chain_plan};
use crate::common::fake_worker::{Script, ScriptedWorker};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use plandag::engine::{
    ABORTED_ERROR, Orchestrator, OrchestratorOptions, ProgressEvent, ProgressSink,
};
use plandag::errors::PlandagError;
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

fn drain(rx: &mut mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn events_follow_rounds_and_completions() -> TestResult {
    with_timeout(async {
        init_tracing();

        let plan = PlanBuilder::new("abc")
            .task("A", &[])
            .task("B", &["A"])
            .task("C", &[])
            .build();
        let worker = ScriptedWorker::for_plan(&plan).delay("A", Duration::from_millis(50));

        let (sink, mut rx) = ProgressSink::channel(64);
        let orchestrator = Orchestrator::new(Arc::new(worker)).with_progress(sink);
        orchestrator.execute(&plan).await?;

        let started = |id: &str| ProgressEvent::TaskStarted { task: id.into() };
        let completed = |id: &str| ProgressEvent::TaskCompleted { task: id.into() };

        assert_eq!(
            drain(&mut rx),
            vec![
                ProgressEvent::Planned { tasks: 3 },
                ProgressEvent::RoundStarted {
                    round: 1,
                    tasks: vec!["A".into(), "C".into()],
                },
                started("A"),
                started("C"),
                completed("C"),
                completed("A"),
                ProgressEvent::RoundStarted {
                    round: 2,
                    tasks: vec!["B".into()],
                },
                started("B"),
                completed("B"),
                ProgressEvent::Finished,
            ]
        );

        Ok(())
    })
    .await
}

#[tokio::test]
async fn failed_results_and_aborts_are_reported() -> TestResult {
    with_timeout(async {
        init_tracing();

        let plan = PlanBuilder::new("failures")
            .task("task-001", &[])
            .task("task-002", &["task-001"])
            .task("task-003", &["task-001"])
            .build();
        let worker = ScriptedWorker::for_plan(&plan)
            .script("task-001", Script::Error("no sources".to_string()))
            .script("task-002", Script::Fail("crashed".to_string()))
            .delay("task-003", Duration::from_millis(200));

        let (sink, mut rx) = ProgressSink::channel(64);
        let orchestrator = Orchestrator::new(Arc::new(worker)).with_progress(sink);
        assert!(orchestrator.execute(&plan).await.is_err());

        let events = drain(&mut rx);
        assert!(events.contains(&ProgressEvent::TaskFailed {
            task: "task-001".into(),
            error: "no sources".into(),
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::TaskFailed { task, error } if task == "task-002" && error.contains("crashed")
        )));
        // The slow sibling is cut short but still gets a terminal event.
        assert!(events.contains(&ProgressEvent::TaskFailed {
            task: "task-003".into(),
            error: ABORTED_ERROR.into(),
        }));
        for event in &events {
            if let ProgressEvent::TaskStarted { task } = event {
                let terminal = events
                    .iter()
                    .filter(|e| match e {
                        ProgressEvent::TaskCompleted { task: t }
                        | ProgressEvent::TaskFailed { task: t, .. } => t == task,
                        _ => false,
                    })
                    .count();
                assert_eq!(terminal, 1, "{task} needs exactly one terminal event");
            }
        }
        assert_eq!(events.last(), Some(&ProgressEvent::Finished));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn tiny_buffer_never_stalls_the_run() -> TestResult {
    with_timeout(async {
        init_tracing();

        let plan = chain_plan(6);
        let worker = ScriptedWorker::for_plan(&plan);

        // Nobody reads the receiver until the run is over.
        let (sink, mut rx) = ProgressSink::channel(1);
        let orchestrator = Orchestrator::new(Arc::new(worker)).with_progress(sink);
        let run = orchestrator.execute(&plan).await?;

        assert_eq!(run.len(), 6);
        assert_eq!(drain(&mut rx), vec![ProgressEvent::Planned { tasks: 6 }]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn repeated_ids_are_rejected_before_announcing_the_plan() -> TestResult {
    with_timeout(async {
        init_tracing();

        let plan = PlanBuilder::new("dup")
            .task("task-001", &[])
            .task("task-001", &[])
            .build();
        let worker = ScriptedWorker::for_plan(&plan);

        let (sink, mut rx) = ProgressSink::channel(64);
        let orchestrator = Orchestrator::new(Arc::new(worker.clone()))
            .with_progress(sink)
            .with_options(OrchestratorOptions {
                validate: false,
                check_task_ids: false,
            });

        let err = orchestrator.execute(&plan).await.unwrap_err();
        assert!(matches!(err, PlandagError::DuplicateTask(id) if id == "task-001"));
        assert!(drain(&mut rx).is_empty());
        assert!(worker.log().is_empty());

        Ok(())
    })
    .await
}
