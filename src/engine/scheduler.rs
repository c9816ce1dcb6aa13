// src/engine/scheduler.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::dag::{DependencyGraph, RunTracker, TaskRunState};
use crate::engine::{CancelToken, TaskName};
use crate::errors::{GraphError, PipelineError};
use crate::exec::{ExecutorBackend, TaskJob};
use crate::summary::{ExecutionSummary, RunResult};
use crate::task::{DependencyOutputs, SharedTask, TaskFault, TaskOutput};

/// Executes one pipeline run over a validated graph.
///
/// It is responsible for:
/// - rejecting an invalid graph before any task runs
/// - walking the topological layers in order, with a barrier between them
/// - building each task's dependency view from the result table
/// - recording exactly one summary per task
/// - honouring cancellation at layer boundaries
pub struct Scheduler<'p, S> {
    graph: &'p DependencyGraph,
    tasks: &'p HashMap<TaskName, SharedTask<S>>,
    executor: &'p dyn ExecutorBackend<S>,
    run_id: u64,
}

impl<'p, S> Scheduler<'p, S>
where
    S: Send + Sync + 'static,
{
    pub fn new(
        graph: &'p DependencyGraph,
        tasks: &'p HashMap<TaskName, SharedTask<S>>,
        executor: &'p dyn ExecutorBackend<S>,
        run_id: u64,
    ) -> Self {
        Self {
            graph,
            tasks,
            executor,
            run_id,
        }
    }

    /// Run every task of the graph once and return their summaries.
    pub async fn run(
        &self,
        shared: Arc<S>,
        cancel: Option<&CancelToken>,
    ) -> Result<RunResult, PipelineError> {
        let layers = self.graph.topological_layers()?;
        self.ensure_implementations()?;

        let total = self.graph.len();
        info!(
            run_id = self.run_id,
            tasks = total,
            layers = layers.len(),
            "starting pipeline run"
        );

        let started = Instant::now();
        let mut tracker = RunTracker::new(self.graph);
        let mut result = RunResult::new();

        for (layer_idx, layer) in layers.iter().enumerate() {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                info!(
                    run_id = self.run_id,
                    layer = layer_idx,
                    completed = result.len(),
                    total,
                    "run cancelled at layer boundary"
                );
                return Err(PipelineError::Cancelled {
                    partial: result,
                    total,
                });
            }

            debug!(run_id = self.run_id, layer = layer_idx, tasks = ?layer, "starting layer");

            let jobs = self.prepare_layer(layer, layer_idx, &mut tracker, &result);
            let expected: Vec<(TaskName, Vec<TaskName>)> = jobs
                .iter()
                .map(|j| (j.name.clone(), j.deps.names().map(str::to_string).collect()))
                .collect();

            let summaries = self.executor.run_layer(jobs, &shared).await;

            for summary in summaries {
                self.record(summary, &mut tracker, &mut result);
            }

            // Every task of the layer must end up Done, even if the backend
            // dropped it.
            for (name, deps) in expected {
                if !result.contains(&name) {
                    warn!(task = %name, layer = layer_idx, "executor returned no summary; recording failure");
                    let lost = ExecutionSummary::new(
                        name,
                        deps,
                        TaskOutput::new(TaskFault::Aborted {
                            reason: "executor returned no summary".to_string(),
                        }),
                        Duration::ZERO,
                        false,
                        layer_idx,
                    );
                    self.record(lost, &mut tracker, &mut result);
                }
            }
        }

        if !tracker.all_done() {
            warn!(run_id = self.run_id, "run finished with tasks not in a terminal state");
        }
        info!(
            run_id = self.run_id,
            succeeded = tracker.count_in(TaskRunState::DoneSuccess),
            failed = tracker.count_in(TaskRunState::DoneFailed),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run finished"
        );

        Ok(result)
    }

    /// Every node of the graph needs a task to invoke.
    fn ensure_implementations(&self) -> Result<(), GraphError> {
        for name in self.graph.task_names() {
            if !self.tasks.contains_key(name) {
                return Err(GraphError::UnknownTask(name.to_string()));
            }
        }
        Ok(())
    }

    /// Move the tasks of a layer to `Running` and build their jobs.
    fn prepare_layer(
        &self,
        layer: &[TaskName],
        layer_idx: usize,
        tracker: &mut RunTracker<'_>,
        result: &RunResult,
    ) -> Vec<TaskJob<S>> {
        let mut jobs = Vec::with_capacity(layer.len());

        for name in layer {
            // Both checks hold for layers of a validated graph whose
            // implementations were checked up front.
            let Some(task) = self.tasks.get(name) else {
                continue;
            };
            if !tracker.mark_ready(name) {
                warn!(task = %name, "task not ready in its own layer; skipping");
                continue;
            }

            let mut deps = DependencyOutputs::new();
            for dep in self.graph.dependencies_of(name) {
                if deps.contains(dep) {
                    continue;
                }
                if let Some(summary) = result.get_shared(dep) {
                    deps.push(dep.clone(), summary);
                }
            }

            tracker.mark_running(name);
            jobs.push(TaskJob {
                name: name.clone(),
                task: Arc::clone(task),
                deps,
                layer: layer_idx,
            });
        }

        jobs
    }

    fn record(&self, summary: ExecutionSummary, tracker: &mut RunTracker<'_>, result: &mut RunResult) {
        let name = summary.task_name().to_string();
        if !tracker.mark_done(&name, summary.outcome()) {
            warn!(task = %name, "summary for a task that is not running; discarding");
            return;
        }
        result.insert(Arc::new(summary));
    }
}
