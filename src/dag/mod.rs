// src/dag/mod.rs

//! Dependency graph representation and per-run state.
//!
//! - [`descriptor`] names a task and its dependencies.
//! - [`graph`] holds the graph, validates it and computes layers.
//! - [`state`] tracks the per-run state machine of each task.

pub mod descriptor;
pub mod graph;
pub mod state;

pub use descriptor::TaskDescriptor;
pub use graph::DependencyGraph;
pub use state::{RunTracker, TaskRunState};
