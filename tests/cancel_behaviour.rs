mod common;
use crate::common::builders::desc;
use crate::common::recording::{RecordingTask, call_log, snapshot};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;

use pipedag::{
    CancelToken, DependencyOutputs, ExecutionMode, ExecutorOptions, Pipeline, PipelineError,
    TaskResult,
};

#[tokio::test]
async fn cancel_takes_effect_at_the_next_layer_boundary() {
    init_tracing();

    let log = call_log();
    let cancel = CancelToken::new();

    let mut pipeline = Pipeline::new();
    {
        let cancel = cancel.clone();
        let log = Arc::clone(&log);
        pipeline
            .register_fn(desc("first", &[]), move |_: &DependencyOutputs, _: &()| {
                log.lock().unwrap().push("first".to_string());
                cancel.cancel();
                TaskResult::success(())
            })
            .unwrap();
    }
    // Same layer as `first`: already scheduled, so it still runs.
    pipeline.register(desc("sibling", &[]), RecordingTask::ok("sibling", &log)).unwrap();
    pipeline.register(desc("second", &["first"]), RecordingTask::ok("second", &log)).unwrap();
    pipeline.register(desc("third", &["second"]), RecordingTask::ok("third", &log)).unwrap();

    let err = pipeline.run_with_cancel((), &cancel).await.unwrap_err();
    match err {
        PipelineError::Cancelled { partial, total } => {
            assert_eq!(total, 4);
            assert_eq!(partial.names().collect::<Vec<_>>(), vec!["first", "sibling"]);
            assert!(partial.all_succeeded());
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert_eq!(snapshot(&log), vec!["first", "sibling"]);
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let log = call_log();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut pipeline = Pipeline::new();
    pipeline.register(desc("A", &[]), RecordingTask::ok("A", &log)).unwrap();

    match pipeline.run_with_cancel((), &cancel).await {
        Err(PipelineError::Cancelled { partial, total }) => {
            assert!(partial.is_empty());
            assert_eq!(total, 1);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(snapshot(&log).is_empty());
}

#[tokio::test]
async fn untriggered_token_does_not_affect_the_run() {
    let log = call_log();
    let cancel = CancelToken::new();

    let mut pipeline = Pipeline::with_options(&ExecutorOptions {
        mode: ExecutionMode::Parallel,
        max_workers: 2,
        task_timeout: None,
    });
    pipeline.register(desc("A", &[]), RecordingTask::ok("A", &log)).unwrap();
    pipeline.register(desc("B", &["A"]), RecordingTask::ok("B", &log)).unwrap();

    let result = with_timeout(pipeline.run_with_cancel((), &cancel)).await.unwrap();
    assert_eq!(result.len(), 2);
    assert!(!cancel.is_cancelled());
}
