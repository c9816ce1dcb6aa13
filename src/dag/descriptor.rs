// src/dag/descriptor.rs

use crate::engine::TaskName;

/// Identifies a unit of work and the tasks it must wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: TaskName,
    /// Direct dependencies. Order does not affect scheduling; it is the
    /// order in which the task sees them in its dependency view.
    pub dependencies: Vec<TaskName>,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies<I, D>(name: impl Into<TaskName>, deps: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<TaskName>,
    {
        Self {
            name: name.into(),
            dependencies: deps.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder-style: add one dependency.
    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.dependencies.push(dep.into());
        self
    }
}
