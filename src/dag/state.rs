// src/dag/state.rs

//! Per-run task state tracking.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::DependencyGraph;
use crate::engine::{TaskName, TaskOutcome};

/// Per-run state of a task.
///
/// `Pending -> Ready -> Running -> DoneSuccess | DoneFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting for at least one dependency to finish.
    Pending,
    /// Every dependency is done (successfully or not).
    Ready,
    /// Handed to the executor.
    Running,
    DoneSuccess,
    DoneFailed,
}

impl TaskRunState {
    pub fn is_done(self) -> bool {
        matches!(self, TaskRunState::DoneSuccess | TaskRunState::DoneFailed)
    }
}

/// Tracks the state of every task taking part in one run.
///
/// The scheduler is the only writer; transitions that would break the state
/// machine are refused and logged rather than applied.
#[derive(Debug)]
pub struct RunTracker<'g> {
    graph: &'g DependencyGraph,
    states: HashMap<TaskName, TaskRunState>,
}

impl<'g> RunTracker<'g> {
    /// Start a run with every task of `graph` pending.
    pub fn new(graph: &'g DependencyGraph) -> Self {
        let states = graph
            .task_names()
            .map(|name| (name.to_string(), TaskRunState::Pending))
            .collect();
        Self { graph, states }
    }

    pub fn state_of(&self, task: &str) -> Option<TaskRunState> {
        self.states.get(task).copied()
    }

    /// Whether every dependency of `task` has reached a terminal state.
    pub fn deps_done(&self, task: &str) -> bool {
        self.graph.dependencies_of(task).iter().all(|dep| {
            self.states
                .get(dep)
                .is_some_and(|state| state.is_done())
        })
    }

    /// Promote `task` from `Pending` to `Ready` if its dependencies are done.
    pub fn mark_ready(&mut self, task: &str) -> bool {
        if !self.deps_done(task) {
            warn!(task = %task, "refusing to mark task ready: dependencies not done");
            return false;
        }
        self.transition(task, TaskRunState::Pending, TaskRunState::Ready)
    }

    pub fn mark_running(&mut self, task: &str) -> bool {
        self.transition(task, TaskRunState::Ready, TaskRunState::Running)
    }

    pub fn mark_done(&mut self, task: &str, outcome: TaskOutcome) -> bool {
        let to = match outcome {
            TaskOutcome::Success => TaskRunState::DoneSuccess,
            TaskOutcome::Failed => TaskRunState::DoneFailed,
        };
        self.transition(task, TaskRunState::Running, to)
    }

    fn transition(&mut self, task: &str, from: TaskRunState, to: TaskRunState) -> bool {
        match self.states.get_mut(task) {
            Some(state) if *state == from => {
                debug!(task = %task, ?from, ?to, "task state transition");
                *state = to;
                true
            }
            Some(state) => {
                warn!(task = %task, current = ?*state, ?to, "invalid task state transition; ignoring");
                false
            }
            None => {
                warn!(task = %task, "state transition for task outside this run; ignoring");
                false
            }
        }
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_done(&self) -> bool {
        self.states.values().all(|s| s.is_done())
    }

    pub fn count_in(&self, state: TaskRunState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }
}
