// src/errors.rs

//! Crate-wide error types.
//!
//! - [`GraphError`]: the dependency graph is unusable; detected before any
//!   task runs.
//! - [`PipelineError`]: why a `Pipeline::run*` call did not produce a full
//!   [`RunResult`].
//! - [`ConfigError`]: a pipeline manifest could not be loaded or turned into
//!   a pipeline.
//!
//! Failures of individual tasks are *not* errors here; they are recorded in
//! the task's [`ExecutionSummary`](crate::summary::ExecutionSummary).

use thiserror::Error;

use crate::engine::TaskName;
use crate::summary::RunResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("task '{0}' is registered more than once")]
    DuplicateName(TaskName),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: TaskName, dependency: TaskName },

    #[error("cycle detected in task graph: {}", .0.join(" -> "))]
    Cycle(Vec<TaskName>),

    #[error("task not found: {0}")]
    UnknownTask(TaskName),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The run was cancelled at a layer boundary. `partial` holds the
    /// summaries of every task that reached `Done` before cancellation.
    #[error("run cancelled after {} of {total} tasks", partial.len())]
    Cancelled { partial: RunResult, total: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("plugin '{plugin}' uses unknown plugin kind '{uses}'")]
    UnknownPluginKind { plugin: TaskName, uses: String },

    #[error("failed to build plugin '{plugin}': {source}")]
    PluginFactory {
        plugin: TaskName,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

