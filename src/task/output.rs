// src/task/output.rs

//! Type-erased task payloads.
//!
//! Tasks are authored independently, so the graph cannot know the concrete
//! type each one produces. Outputs are stored as
//! `Arc<dyn Any + Send + Sync>` and consumers downcast them to the type they
//! expect by convention (e.g. `Vec<Transcript>` for transcript stages).

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type Dynamic = Arc<dyn Any + Send + Sync>;

/// Opaque output of a task. Cloning is cheap and never copies the payload.
#[derive(Clone)]
pub struct TaskOutput(Dynamic);

impl TaskOutput {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Output for tasks that have nothing to hand downstream.
    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Convenience for the common case of string diagnostics.
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        self.downcast_ref::<&'static str>().copied()
    }

    /// The captured-error marker, if this output was produced by the
    /// scheduler rather than by the task itself.
    pub fn fault(&self) -> Option<&TaskFault> {
        self.downcast_ref::<TaskFault>()
    }
}

impl From<Arc<dyn Any + Send + Sync>> for TaskOutput {
    fn from(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fault) = self.fault() {
            return f.debug_tuple("TaskOutput").field(fault).finish();
        }
        match self.as_str() {
            Some(s) => f.debug_tuple("TaskOutput").field(&s).finish(),
            None => f.write_str("TaskOutput(..)"),
        }
    }
}

/// Marker stored as the output of a task that did not return normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFault {
    /// The task implementation panicked.
    Panicked { message: String },
    /// The task did not finish within the configured per-task timeout.
    TimedOut { after: Duration },
    /// The executor lost the task before it produced a result.
    Aborted { reason: String },
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFault::Panicked { message } => write!(f, "task panicked: {message}"),
            TaskFault::TimedOut { after } => write!(f, "task timed out after {after:?}"),
            TaskFault::Aborted { reason } => write!(f, "task aborted: {reason}"),
        }
    }
}

/// Render a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
