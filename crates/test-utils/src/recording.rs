use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use pipedag::exec::TaskJob;
use pipedag::{DependencyOutputs, ExecutionSummary, ExecutorBackend, Task, TaskResult};

/// Shared, ordered log of task names.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A task that:
/// - appends its name to a shared log when it runs
/// - outputs `"<name>-out"` (or `"<name> failed"` when told to fail)
pub struct RecordingTask {
    name: String,
    log: CallLog,
    succeed: bool,
}

impl RecordingTask {
    pub fn ok(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            succeed: true,
        }
    }

    pub fn failing(name: &str, log: &CallLog) -> Self {
        Self {
            succeed: false,
            ..Self::ok(name, log)
        }
    }
}

impl<S> Task<S> for RecordingTask {
    fn run(&self, _deps: &DependencyOutputs, _shared: &S) -> TaskResult {
        self.log.lock().unwrap().push(self.name.clone());
        if self.succeed {
            TaskResult::success(format!("{}-out", self.name))
        } else {
            TaskResult::failure(format!("{} failed", self.name))
        }
    }
}

/// Executor wrapper that records the job names of every layer it is handed,
/// then delegates to the wrapped backend.
pub struct RecordingExecutor<S> {
    inner: Arc<dyn ExecutorBackend<S>>,
    layers: Arc<Mutex<Vec<Vec<String>>>>,
}

impl<S> RecordingExecutor<S> {
    pub fn new(inner: Arc<dyn ExecutorBackend<S>>) -> Self {
        Self {
            inner,
            layers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn layers(&self) -> Vec<Vec<String>> {
        self.layers.lock().unwrap().clone()
    }
}

impl<S> ExecutorBackend<S> for RecordingExecutor<S>
where
    S: Send + Sync,
{
    fn run_layer<'a>(
        &'a self,
        jobs: Vec<TaskJob<S>>,
        shared: &'a Arc<S>,
    ) -> Pin<Box<dyn Future<Output = Vec<ExecutionSummary>> + Send + 'a>> {
        {
            let mut guard = self.layers.lock().unwrap();
            guard.push(jobs.iter().map(|j| j.name.clone()).collect());
        }
        self.inner.run_layer(jobs, shared)
    }
}
