// src/task/mod.rs

//! The task ("plugin") contract.
//!
//! - [`Task`] is the trait every stage implements.
//! - [`output`] holds the type-erased payload passed between stages and the
//!   fault marker the scheduler records for tasks that panic or time out.
//! - [`deps`] is the read-only dependency view handed to each task.

pub mod deps;
pub mod output;

use std::fmt;
use std::sync::Arc;

pub use deps::DependencyOutputs;
pub use output::{TaskFault, TaskOutput};

/// Value returned by a task: an opaque output plus a success flag.
///
/// Expected failures are reported with `success = false` and a diagnostic
/// output rather than by panicking.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub output: TaskOutput,
    pub success: bool,
}

impl TaskResult {
    pub fn success<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self {
            output: TaskOutput::new(value),
            success: true,
        }
    }

    pub fn failure<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self {
            output: TaskOutput::new(value),
            success: false,
        }
    }

    /// Standard result for a task that refuses to work on a failed input.
    pub fn skipped(failed_dependency: &str) -> Self {
        Self::failure(format!("skipped: dependency {failed_dependency} failed"))
    }
}

/// A unit of work in the pipeline.
///
/// `S` is the run-scoped shared input. The scheduler guarantees that `run`
/// is called at most once per pipeline run, and only after every declared
/// dependency has finished.
pub trait Task<S>: Send + Sync {
    fn run(&self, deps: &DependencyOutputs, shared: &S) -> TaskResult;
}

/// Adapter turning a closure into a [`Task`].
pub struct FnTask<F>(F);

impl<F> FnTask<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTask(..)")
    }
}

impl<S, F> Task<S> for FnTask<F>
where
    F: Fn(&DependencyOutputs, &S) -> TaskResult + Send + Sync,
{
    fn run(&self, deps: &DependencyOutputs, shared: &S) -> TaskResult {
        (self.0)(deps, shared)
    }
}

/// Shared, type-erased task handle as stored in the pipeline registry.
pub type SharedTask<S> = Arc<dyn Task<S>>;
