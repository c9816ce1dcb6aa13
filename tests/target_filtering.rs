mod common;
use crate::common::builders::desc;
use crate::common::recording::{RecordingTask, call_log, snapshot};

use pipedag::{GraphError, Pipeline, PipelineError};

fn transcript_pipeline(log: &common::recording::CallLog) -> Pipeline<()> {
    // transcript -> gaps -> write
    //            -> overlaps
    // stats (independent)
    let mut pipeline = Pipeline::new();
    pipeline.register(desc("transcript", &[]), RecordingTask::ok("transcript", log)).unwrap();
    pipeline.register(desc("gaps", &["transcript"]), RecordingTask::ok("gaps", log)).unwrap();
    pipeline
        .register(desc("overlaps", &["transcript"]), RecordingTask::ok("overlaps", log))
        .unwrap();
    pipeline.register(desc("write", &["gaps"]), RecordingTask::ok("write", log)).unwrap();
    pipeline.register(desc("stats", &[]), RecordingTask::ok("stats", log)).unwrap();
    pipeline
}

#[tokio::test]
async fn target_runs_only_its_transitive_dependencies() {
    let log = call_log();
    let pipeline = transcript_pipeline(&log);

    let result = pipeline.run_targets((), ["write"]).await.unwrap();
    assert_eq!(
        result.names().collect::<Vec<_>>(),
        vec!["transcript", "gaps", "write"]
    );
    assert_eq!(snapshot(&log), vec!["transcript", "gaps", "write"]);
}

#[tokio::test]
async fn multiple_targets_share_dependencies() {
    let log = call_log();
    let pipeline = transcript_pipeline(&log);

    let result = pipeline
        .run_targets((), vec!["overlaps".to_string(), "gaps".to_string()])
        .await
        .unwrap();
    assert_eq!(result.len(), 3);
    assert!(result.contains("transcript"));
    assert!(!result.contains("write"));
    assert!(!result.contains("stats"));
    assert_eq!(snapshot(&log).iter().filter(|n| *n == "transcript").count(), 1);
}

#[tokio::test]
async fn unknown_target_is_rejected() {
    let log = call_log();
    let pipeline = transcript_pipeline(&log);

    match pipeline.run_targets((), ["nope"]).await {
        Err(PipelineError::Graph(GraphError::UnknownTask(name))) => assert_eq!(name, "nope"),
        other => panic!("expected unknown task, got {other:?}"),
    }
    assert!(snapshot(&log).is_empty());
}

#[tokio::test]
async fn cycle_outside_the_target_still_blocks_the_run() {
    let log = call_log();
    let mut pipeline = transcript_pipeline(&log);
    pipeline.register(desc("p", &["q"]), RecordingTask::ok("p", &log)).unwrap();
    pipeline.register(desc("q", &["p"]), RecordingTask::ok("q", &log)).unwrap();

    let err = pipeline.run_targets((), ["gaps"]).await.unwrap_err();
    assert!(matches!(err, PipelineError::Graph(GraphError::Cycle(_))));
    assert!(snapshot(&log).is_empty());
}
