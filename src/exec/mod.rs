// src/exec/mod.rs

//! Task execution layer.
//!
//! This module is responsible for actually invoking task implementations
//! for one layer at a time and turning each invocation into an
//! [`ExecutionSummary`](crate::summary::ExecutionSummary).
//!
//! - [`task_runner`] runs a single task: timing, panic containment, logging.
//! - [`backend`] provides the `ExecutorBackend` trait the scheduler talks
//!   to, and which tests can replace with a fake implementation.
//! - [`sequential`] runs a layer in order on the calling task.
//! - [`pool`] runs a layer on a bounded blocking worker pool.

pub mod backend;
pub mod pool;
pub mod sequential;
pub mod task_runner;

pub use backend::{ExecutorBackend, ExecutorOptions, backend_for};
pub use pool::PoolExecutor;
pub use sequential::SequentialExecutor;
pub use task_runner::{TaskJob, run_job};
