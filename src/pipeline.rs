// src/pipeline.rs

//! The pipeline facade: a task registry bound to its dependency graph.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::dag::{DependencyGraph, TaskDescriptor};
use crate::engine::{CancelToken, Scheduler, TaskName};
use crate::errors::{GraphError, PipelineError};
use crate::exec::{ExecutorBackend, ExecutorOptions, SequentialExecutor, backend_for};
use crate::summary::RunResult;
use crate::task::{DependencyOutputs, FnTask, SharedTask, Task, TaskResult};

/// Owns a dependency graph and the task implementations for it.
///
/// Built once, then run any number of times with different shared inputs.
/// Each call to [`run`](Self::run) produces an independent [`RunResult`];
/// nothing is carried over between runs.
pub struct Pipeline<S> {
    graph: DependencyGraph,
    tasks: HashMap<TaskName, SharedTask<S>>,
    executor: Arc<dyn ExecutorBackend<S>>,
    run_counter: AtomicU64,
}

impl<S> fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl<S> Default for Pipeline<S>
where
    S: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Pipeline<S>
where
    S: Send + Sync + 'static,
{
    /// An empty pipeline that runs layers sequentially.
    pub fn new() -> Self {
        Self::with_executor(Arc::new(SequentialExecutor::new()))
    }

    pub fn with_executor(executor: Arc<dyn ExecutorBackend<S>>) -> Self {
        Self {
            graph: DependencyGraph::new(),
            tasks: HashMap::new(),
            executor,
            run_counter: AtomicU64::new(0),
        }
    }

    pub fn with_options(options: &ExecutorOptions) -> Self {
        Self::with_executor(backend_for(options))
    }

    /// Register a task under `descriptor.name`.
    ///
    /// Fails with [`GraphError::DuplicateName`] if the name is taken, in
    /// which case the existing registration is left untouched. Dependencies
    /// are not checked here; tasks may be registered in any order and the
    /// graph is validated when it runs.
    pub fn register<T>(&mut self, descriptor: TaskDescriptor, task: T) -> Result<(), GraphError>
    where
        T: Task<S> + 'static,
    {
        self.register_shared(descriptor, Arc::new(task))
    }

    pub fn register_shared(
        &mut self,
        descriptor: TaskDescriptor,
        task: SharedTask<S>,
    ) -> Result<(), GraphError> {
        let name = descriptor.name.clone();
        self.graph.add(descriptor)?;
        debug!(task = %name, deps = ?self.graph.dependencies_of(&name), "registered task");
        self.tasks.insert(name, task);
        Ok(())
    }

    /// Register a closure as a task.
    pub fn register_fn<F>(&mut self, descriptor: TaskDescriptor, f: F) -> Result<(), GraphError>
    where
        F: Fn(&DependencyOutputs, &S) -> TaskResult + Send + Sync + 'static,
    {
        self.register(descriptor, FnTask::new(f))
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        self.graph.validate()
    }

    /// Execution layers, as the scheduler will run them.
    pub fn layers(&self) -> Result<Vec<Vec<TaskName>>, GraphError> {
        self.graph.topological_layers()
    }

    /// Run every registered task once.
    pub async fn run(&self, shared: S) -> Result<RunResult, PipelineError> {
        self.run_graph(&self.graph, shared, None).await
    }

    /// Like [`run`](Self::run), but stops at the next layer boundary once
    /// `cancel` is triggered.
    pub async fn run_with_cancel(
        &self,
        shared: S,
        cancel: &CancelToken,
    ) -> Result<RunResult, PipelineError> {
        self.run_graph(&self.graph, shared, Some(cancel)).await
    }

    /// Run only `targets` and everything they transitively depend on.
    ///
    /// The graph is validated as a whole first, so a cycle elsewhere still
    /// prevents the run.
    pub async fn run_targets<I, T>(&self, shared: S, targets: I) -> Result<RunResult, PipelineError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.graph.validate()?;
        let subgraph = self.graph.closure_of(targets)?;
        self.run_graph(&subgraph, shared, None).await
    }

    async fn run_graph(
        &self,
        graph: &DependencyGraph,
        shared: S,
        cancel: Option<&CancelToken>,
    ) -> Result<RunResult, PipelineError> {
        let run_id = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let scheduler = Scheduler::new(graph, &self.tasks, self.executor.as_ref(), run_id);
        scheduler.run(Arc::new(shared), cancel).await
    }
}
