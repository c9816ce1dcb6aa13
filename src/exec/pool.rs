// src/exec/pool.rs

//! Bounded parallel execution of one layer on tokio's blocking pool.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::exec::ExecutorBackend;
use crate::exec::task_runner::{TaskJob, run_job};
use crate::summary::ExecutionSummary;
use crate::task::TaskFault;

/// Runs the tasks of a layer concurrently, at most `max_workers` at a time.
///
/// Task bodies are synchronous and may block, so each one runs inside
/// `spawn_blocking`. Summaries are collected by the calling future as the
/// tasks finish; workers never touch the result table.
///
/// The worker slots are shared by every layer this executor runs, so the
/// limit also covers threads left over from a previous layer.
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    max_workers: usize,
    task_timeout: Option<Duration>,
    slots: Arc<Semaphore>,
}

impl PoolExecutor {
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            task_timeout: None,
            slots: Arc::new(Semaphore::new(max_workers)),
        }
    }

    /// Give up waiting for a task after `timeout`.
    ///
    /// A timed-out task is recorded as [`TaskFault::TimedOut`] and its
    /// eventual result is discarded. Its thread cannot be interrupted: it
    /// keeps its worker slot until the task body returns, so later tasks
    /// (in this layer or the next) queue behind it instead of exceeding
    /// `max_workers`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

impl<S> ExecutorBackend<S> for PoolExecutor
where
    S: Send + Sync + 'static,
{
    fn run_layer<'a>(
        &'a self,
        jobs: Vec<TaskJob<S>>,
        shared: &'a Arc<S>,
    ) -> Pin<Box<dyn Future<Output = Vec<ExecutionSummary>> + Send + 'a>> {
        let permits = Arc::clone(&self.slots);
        let timeout = self.task_timeout;
        let shared = Arc::clone(shared);

        Box::pin(async move {
            let total = jobs.len();
            let mut set: JoinSet<ExecutionSummary> = JoinSet::new();

            for job in jobs {
                let permits = Arc::clone(&permits);
                let shared = Arc::clone(&shared);
                set.spawn(async move { run_with_permit(job, shared, permits, timeout).await });
            }

            let mut summaries = Vec::with_capacity(total);
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(summary) => summaries.push(summary),
                    // run_with_permit never panics itself; this only fires
                    // if the runtime is shutting down underneath us.
                    Err(e) => error!(error = %e, "layer worker was aborted"),
                }
            }

            debug!(tasks = total, collected = summaries.len(), "layer finished");
            summaries
        })
    }
}

async fn run_with_permit<S>(
    job: TaskJob<S>,
    shared: Arc<S>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> ExecutionSummary
where
    S: Send + Sync + 'static,
{
    // The semaphore is never closed, so acquiring can only fail if that
    // invariant is broken; run without a permit rather than drop the task.
    let permit = permits.acquire_owned().await.ok();

    let job = Arc::new(job);
    let worker_job = Arc::clone(&job);
    let started = Instant::now();
    // The permit lives on the worker thread: it is released when the task
    // body returns, not when we stop waiting for it.
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        run_job(&worker_job, shared.as_ref())
    });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                return job.fault_summary(TaskFault::TimedOut { after: limit }, limit);
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(summary) => summary,
        Err(e) => {
            let fault = if e.is_panic() {
                TaskFault::Panicked {
                    message: crate::task::output::panic_message(e.into_panic().as_ref()),
                }
            } else {
                TaskFault::Aborted {
                    reason: e.to_string(),
                }
            };
            job.fault_summary(fault, started.elapsed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{DependencyOutputs, FnTask, TaskResult};

    fn sleeper(name: &str, ms: u64) -> TaskJob<()> {
        TaskJob {
            name: name.to_string(),
            task: Arc::new(FnTask::new(move |_: &DependencyOutputs, _: &()| {
                std::thread::sleep(Duration::from_millis(ms));
                TaskResult::success(ms)
            })),
            deps: DependencyOutputs::new(),
            layer: 0,
        }
    }

    #[tokio::test]
    async fn collects_every_job_of_the_layer() {
        let pool = PoolExecutor::new(2);
        let shared = Arc::new(());
        let jobs = vec![sleeper("a", 30), sleeper("b", 0), sleeper("c", 10)];

        let summaries = pool.run_layer(jobs, &shared).await;

        let mut names: Vec<_> = summaries.iter().map(|s| s.task_name().to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(summaries.iter().all(|s| s.success()));
    }

    #[tokio::test]
    async fn slow_task_times_out_without_blocking_the_layer() {
        let pool = PoolExecutor::new(4).with_timeout(Some(Duration::from_millis(50)));
        let shared = Arc::new(());
        let jobs = vec![sleeper("slow", 500), sleeper("fast", 0)];

        let summaries = pool.run_layer(jobs, &shared).await;

        let slow = summaries.iter().find(|s| s.task_name() == "slow").unwrap();
        assert!(!slow.success());
        assert_eq!(
            slow.output().fault(),
            Some(&TaskFault::TimedOut {
                after: Duration::from_millis(50)
            })
        );
        let fast = summaries.iter().find(|s| s.task_name() == "fast").unwrap();
        assert!(fast.success());
    }

    #[test]
    fn zero_workers_is_clamped() {
        assert_eq!(PoolExecutor::new(0).max_workers(), 1);
    }
}
