// src/engine/mod.rs

//! Orchestration engine for pipedag.
//!
//! This module ties together:
//! - graph validation and layering (from [`crate::dag`])
//! - the per-run state tracker
//! - the executor backend that actually invokes tasks
//! - cooperative cancellation at layer boundaries
//!
//! The per-run algorithm lives in [`scheduler`]; the cancel flag in
//! [`cancel`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a single task invocation, as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl TaskOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            TaskOutcome::Success
        } else {
            TaskOutcome::Failed
        }
    }
}

pub mod cancel;
pub mod scheduler;

pub use cancel::CancelToken;
pub use scheduler::Scheduler;
