// src/task/deps.rs

//! Read-only view of a task's completed dependencies.

use std::sync::Arc;

use crate::engine::TaskName;
use crate::summary::ExecutionSummary;
use crate::task::TaskOutput;

/// The summaries of exactly the declared dependencies of one task, in
/// declaration order.
///
/// A dependency that failed is still present; downstream tasks are expected
/// to check [`succeeded`](Self::succeeded) before trusting its output.
#[derive(Debug, Clone, Default)]
pub struct DependencyOutputs {
    entries: Vec<(TaskName, Arc<ExecutionSummary>)>,
}

impl DependencyOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: TaskName, summary: Arc<ExecutionSummary>) {
        self.entries.push((name, summary));
    }

    pub fn get(&self, name: &str) -> Option<&ExecutionSummary> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_ref())
    }

    pub fn output(&self, name: &str) -> Option<&TaskOutput> {
        self.get(name).map(|s| s.output())
    }

    /// Downcast a dependency's output, regardless of its success flag.
    pub fn output_as<T: std::any::Any>(&self, name: &str) -> Option<&T> {
        self.output(name).and_then(|o| o.downcast_ref::<T>())
    }

    /// First dependency (in declaration order) whose output is a `T`.
    ///
    /// Lets a stage find its input by data type when the manifest is free
    /// to name the producing stage.
    pub fn find_output<T: std::any::Any>(&self) -> Option<(&str, &T)> {
        self.entries
            .iter()
            .find_map(|(n, s)| s.output().downcast_ref::<T>().map(|v| (n.as_str(), v)))
    }

    /// `Some(success)` if `name` is a dependency of this task.
    pub fn succeeded(&self, name: &str) -> Option<bool> {
        self.get(name).map(|s| s.success())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|(_, s)| s.success())
    }

    /// First failed dependency in declaration order.
    pub fn first_failed(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| !s.success())
            .map(|(n, _)| n.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExecutionSummary)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn dep(name: &str, success: bool) -> Arc<ExecutionSummary> {
        Arc::new(ExecutionSummary::new(
            name.to_string(),
            Vec::new(),
            TaskOutput::new(format!("out-{name}")),
            Duration::ZERO,
            success,
            0,
        ))
    }

    #[test]
    fn lookup_by_name_in_declaration_order() {
        let mut deps = DependencyOutputs::new();
        deps.push("B".into(), dep("B", true));
        deps.push("A".into(), dep("A", false));

        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(deps.output_as::<String>("B").map(String::as_str), Some("out-B"));
        assert_eq!(deps.succeeded("A"), Some(false));
        assert_eq!(deps.succeeded("Z"), None);
        assert_eq!(deps.first_failed(), Some("A"));
        assert!(!deps.all_succeeded());
    }
}
