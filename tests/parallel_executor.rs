mod common;
use crate::common::builders::desc;
use crate::common::recording::{RecordingExecutor, RecordingTask, call_log};
use crate::common::{init_tracing, with_timeout};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pipedag::{
    DependencyOutputs, ExecutionMode, ExecutorOptions, Pipeline, PoolExecutor, TaskFault,
    TaskResult,
};

fn parallel(max_workers: usize, task_timeout: Option<Duration>) -> ExecutorOptions {
    ExecutorOptions {
        mode: ExecutionMode::Parallel,
        max_workers,
        task_timeout,
    }
}

#[tokio::test]
async fn layers_are_handed_to_the_backend_in_order() {
    init_tracing();

    let log = call_log();
    let recorder = Arc::new(RecordingExecutor::<()>::new(Arc::new(PoolExecutor::new(4))));
    let mut pipeline = Pipeline::with_executor(recorder.clone());

    pipeline.register(desc("A", &[]), RecordingTask::ok("A", &log)).unwrap();
    pipeline.register(desc("B", &["A"]), RecordingTask::ok("B", &log)).unwrap();
    pipeline.register(desc("C", &["A"]), RecordingTask::ok("C", &log)).unwrap();
    pipeline.register(desc("E", &[]), RecordingTask::ok("E", &log)).unwrap();
    pipeline.register(desc("D", &["B", "C"]), RecordingTask::ok("D", &log)).unwrap();

    let result = with_timeout(pipeline.run(())).await.unwrap();
    assert_eq!(result.len(), 5);
    assert_eq!(
        recorder.layers(),
        vec![vec!["A", "E"], vec!["B", "C"], vec!["D"]]
    );
    assert_eq!(recorder.layers(), pipeline.layers().unwrap());
}

#[tokio::test]
async fn tasks_of_one_layer_run_concurrently() {
    let barrier = Arc::new(Barrier::new(2));
    let mut pipeline = Pipeline::with_options(&parallel(2, Some(Duration::from_secs(5))));

    for name in ["left", "right"] {
        let barrier = Arc::clone(&barrier);
        pipeline
            .register_fn(desc(name, &[]), move |_: &DependencyOutputs, _: &()| {
                // Only returns once both tasks are running.
                barrier.wait();
                TaskResult::success(())
            })
            .unwrap();
    }

    let result = with_timeout(pipeline.run(())).await.unwrap();
    assert!(result.all_succeeded());
}

#[tokio::test]
async fn worker_limit_bounds_concurrency() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut pipeline = Pipeline::with_options(&parallel(2, None));

    for i in 0..6 {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        pipeline
            .register_fn(desc(&format!("t{i}"), &[]), move |_: &DependencyOutputs, _: &()| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                running.fetch_sub(1, Ordering::SeqCst);
                TaskResult::success(())
            })
            .unwrap();
    }

    let result = with_timeout(pipeline.run(())).await.unwrap();
    assert_eq!(result.len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn timed_out_task_is_a_failure_downstream_can_observe() {
    let mut pipeline = Pipeline::with_options(&parallel(2, Some(Duration::from_millis(50))));

    pipeline
        .register_fn(desc("slow", &[]), |_: &DependencyOutputs, _: &()| {
            thread::sleep(Duration::from_millis(400));
            TaskResult::success("late".to_string())
        })
        .unwrap();
    pipeline
        .register_fn(desc("fast", &[]), |_: &DependencyOutputs, _: &()| {
            TaskResult::success("fast".to_string())
        })
        .unwrap();
    pipeline
        .register_fn(desc("report", &["slow"]), |deps: &DependencyOutputs, _: &()| {
            match deps.first_failed() {
                Some(failed) => TaskResult::skipped(failed),
                None => TaskResult::success(()),
            }
        })
        .unwrap();

    let result = with_timeout(pipeline.run(())).await.unwrap();

    let slow = result.get("slow").unwrap();
    assert!(!slow.success());
    assert!(matches!(
        slow.output().fault(),
        Some(TaskFault::TimedOut { after }) if *after == Duration::from_millis(50)
    ));
    assert!(result.get("fast").unwrap().success());
    assert_eq!(
        result.get("report").unwrap().output().as_str(),
        Some("skipped: dependency slow failed")
    );
}

#[tokio::test]
async fn panics_are_contained_on_worker_threads() {
    let mut pipeline = Pipeline::with_options(&parallel(3, None));
    pipeline
        .register_fn(desc("boom", &[]), |_: &DependencyOutputs, _: &()| -> TaskResult {
            panic!("worker exploded")
        })
        .unwrap();
    pipeline
        .register_fn(desc("fine", &[]), |_: &DependencyOutputs, _: &()| {
            TaskResult::success(1u8)
        })
        .unwrap();

    let result = with_timeout(pipeline.run(())).await.unwrap();
    assert_eq!(result.len(), 2);
    assert!(matches!(
        result.get("boom").unwrap().output().fault(),
        Some(TaskFault::Panicked { message }) if message.contains("worker exploded")
    ));
    assert!(result.get("fine").unwrap().success());
}

#[tokio::test]
async fn timed_out_task_keeps_its_worker_slot() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut pipeline = Pipeline::with_options(&parallel(1, Some(Duration::from_millis(100))));

    let tasks: [(&str, &[&str], u64); 3] =
        [("hung", &[], 400), ("next", &[], 10), ("after", &["next"], 10)];
    for (name, deps, ms) in tasks {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        pipeline
            .register_fn(desc(name, deps), move |_: &DependencyOutputs, _: &()| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(ms));
                running.fetch_sub(1, Ordering::SeqCst);
                TaskResult::success(())
            })
            .unwrap();
    }

    let result = with_timeout(pipeline.run(())).await.unwrap();

    assert!(matches!(
        result.get("hung").unwrap().output().fault(),
        Some(TaskFault::TimedOut { .. })
    ));
    // Both waited for the hung thread to give its slot back.
    assert!(result.get("next").unwrap().success());
    assert!(result.get("after").unwrap().success());
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}
