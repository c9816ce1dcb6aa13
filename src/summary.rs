// src/summary.rs

//! Execution summaries and the per-run result table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{TaskName, TaskOutcome};
use crate::task::TaskOutput;

/// Immutable record of one task's single invocation within a run.
///
/// Created by the executor right after the task returns (or panics, or
/// times out) and never modified afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    task_name: TaskName,
    dependencies: Vec<TaskName>,
    output: TaskOutput,
    elapsed: Duration,
    success: bool,
    layer: usize,
}

impl ExecutionSummary {
    pub fn new(
        task_name: TaskName,
        dependencies: Vec<TaskName>,
        output: TaskOutput,
        elapsed: Duration,
        success: bool,
        layer: usize,
    ) -> Self {
        Self {
            task_name,
            dependencies,
            output,
            elapsed,
            success,
            layer,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Names of the dependencies whose outputs were handed to the task.
    pub fn dependencies(&self) -> &[TaskName] {
        &self.dependencies
    }

    pub fn output(&self) -> &TaskOutput {
        &self.output
    }

    /// Wall-clock time spent inside the task's `run` call.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn outcome(&self) -> TaskOutcome {
        TaskOutcome::from_success(self.success)
    }

    /// Topological layer the task was executed in.
    pub fn layer(&self) -> usize {
        self.layer
    }
}

/// Complete collection of summaries for one run, keyed by task name.
///
/// Iteration yields summaries in completion order.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    entries: Vec<Arc<ExecutionSummary>>,
    index: HashMap<TaskName, usize>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished task. Only the scheduler writes into the table.
    ///
    /// Returns `false` (and keeps the existing entry) if the task was
    /// already recorded.
    pub(crate) fn insert(&mut self, summary: Arc<ExecutionSummary>) -> bool {
        if self.index.contains_key(summary.task_name()) {
            return false;
        }
        self.index
            .insert(summary.task_name().to_string(), self.entries.len());
        self.entries.push(summary);
        true
    }

    pub fn get(&self, task: &str) -> Option<&ExecutionSummary> {
        self.index.get(task).map(|&i| self.entries[i].as_ref())
    }

    /// Shared handle to a summary, as handed to downstream tasks.
    pub(crate) fn get_shared(&self, task: &str) -> Option<Arc<ExecutionSummary>> {
        self.index.get(task).map(|&i| Arc::clone(&self.entries[i]))
    }

    pub fn contains(&self, task: &str) -> bool {
        self.index.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summaries in completion order.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionSummary> {
        self.entries.iter().map(|s| s.as_ref())
    }

    /// Task names in completion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.task_name())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ExecutionSummary> {
        self.iter().filter(|s| s.success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExecutionSummary> {
        self.iter().filter(|s| !s.success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|s| s.success())
    }

    /// Sum of task execution times (not the wall-clock time of the run).
    pub fn total_elapsed(&self) -> Duration {
        self.entries.iter().map(|s| s.elapsed()).sum()
    }
}

impl<'a> IntoIterator for &'a RunResult {
    type Item = &'a ExecutionSummary;
    type IntoIter = Box<dyn Iterator<Item = &'a ExecutionSummary> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
