// src/exec/task_runner.rs

//! Single task invocation: timing, panic containment and logging.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::engine::TaskName;
use crate::summary::ExecutionSummary;
use crate::task::output::panic_message;
use crate::task::{DependencyOutputs, SharedTask, TaskFault, TaskOutput};

/// Everything an executor needs to invoke one task of the current layer.
pub struct TaskJob<S> {
    pub name: TaskName,
    pub task: SharedTask<S>,
    pub deps: DependencyOutputs,
    pub layer: usize,
}

impl<S> TaskJob<S> {
    /// Summary for a job that never produced a value of its own.
    pub fn fault_summary(&self, fault: TaskFault, elapsed: Duration) -> ExecutionSummary {
        error!(
            task = %self.name,
            layer = self.layer,
            error = %fault,
            "task did not return normally; recording failure"
        );
        ExecutionSummary::new(
            self.name.clone(),
            self.deps.names().map(str::to_string).collect(),
            TaskOutput::new(fault),
            elapsed,
            false,
            self.layer,
        )
    }
}

/// Run a task once and turn whatever happens into an [`ExecutionSummary`].
///
/// The elapsed time covers only the task's `run` call. A panic inside the
/// task is caught here and recorded as [`TaskFault::Panicked`]; it never
/// propagates to the scheduler.
pub fn run_job<S>(job: &TaskJob<S>, shared: &S) -> ExecutionSummary {
    debug!(
        task = %job.name,
        layer = job.layer,
        deps = ?job.deps.names().collect::<Vec<_>>(),
        "invoking task"
    );

    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| job.task.run(&job.deps, shared)));
    let elapsed = started.elapsed();

    match result {
        Ok(result) => {
            if result.success {
                info!(
                    task = %job.name,
                    layer = job.layer,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "task completed successfully"
                );
            } else {
                warn!(
                    task = %job.name,
                    layer = job.layer,
                    elapsed_ms = elapsed.as_millis() as u64,
                    output = ?result.output,
                    "task reported failure"
                );
            }
            ExecutionSummary::new(
                job.name.clone(),
                job.deps.names().map(str::to_string).collect(),
                result.output,
                elapsed,
                result.success,
                job.layer,
            )
        }
        Err(payload) => job.fault_summary(
            TaskFault::Panicked {
                message: panic_message(payload.as_ref()),
            },
            elapsed,
        ),
    }
}
