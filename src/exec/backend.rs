// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The scheduler hands one layer at a time to an `ExecutorBackend` and waits
//! for all of its summaries before moving on. This keeps the barrier between
//! layers in the scheduler while letting the backend decide how tasks of a
//! layer are run.
//!
//! - [`SequentialExecutor`](super::SequentialExecutor) runs them one after
//!   another on the calling task.
//! - [`PoolExecutor`](super::PoolExecutor) runs them on tokio's blocking
//!   pool with a bounded number of workers.
//! - Tests can provide their own backend, e.g. one that records layers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::exec::task_runner::TaskJob;
use crate::exec::{PoolExecutor, SequentialExecutor};
use crate::summary::ExecutionSummary;
use crate::types::ExecutionMode;

/// Trait abstracting how the tasks of one layer are executed.
pub trait ExecutorBackend<S>: Send + Sync {
    /// Run every job of a layer exactly once.
    ///
    /// Must return one summary per job, in completion order. Task failures
    /// (including panics and timeouts) are recorded in the summaries and
    /// never abort the layer.
    fn run_layer<'a>(
        &'a self,
        jobs: Vec<TaskJob<S>>,
        shared: &'a Arc<S>,
    ) -> Pin<Box<dyn Future<Output = Vec<ExecutionSummary>> + Send + 'a>>;
}

/// Executor settings, usually taken from the `[config]` manifest section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub mode: ExecutionMode,
    /// Upper bound on concurrently running tasks (parallel mode only).
    pub max_workers: usize,
    /// Per-task timeout (parallel mode only).
    pub task_timeout: Option<Duration>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_workers: 1,
            task_timeout: None,
        }
    }
}

/// Build the backend described by `options`.
pub fn backend_for<S>(options: &ExecutorOptions) -> Arc<dyn ExecutorBackend<S>>
where
    S: Send + Sync + 'static,
{
    match options.mode {
        ExecutionMode::Sequential => {
            if options.task_timeout.is_some() {
                tracing::warn!("task_timeout is only enforced in parallel mode; ignoring");
            }
            Arc::new(SequentialExecutor::new())
        }
        ExecutionMode::Parallel => Arc::new(
            PoolExecutor::new(options.max_workers).with_timeout(options.task_timeout),
        ),
    }
}
