// src/exec/sequential.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::exec::ExecutorBackend;
use crate::exec::task_runner::{TaskJob, run_job};
use crate::summary::ExecutionSummary;

/// Runs the tasks of a layer one by one, in layer order.
///
/// Completion order equals registration order within each layer, which
/// makes this backend fully deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl<S> ExecutorBackend<S> for SequentialExecutor
where
    S: Send + Sync,
{
    fn run_layer<'a>(
        &'a self,
        jobs: Vec<TaskJob<S>>,
        shared: &'a Arc<S>,
    ) -> Pin<Box<dyn Future<Output = Vec<ExecutionSummary>> + Send + 'a>> {
        Box::pin(async move {
            jobs.iter()
                .map(|job| run_job(job, shared.as_ref()))
                .collect()
        })
    }
}
