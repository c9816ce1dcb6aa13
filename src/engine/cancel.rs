// src/engine/cancel.rs

//! Cooperative cancellation for pipeline runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clonable cancellation flag shared between the caller and a running
/// pipeline.
///
/// The scheduler only looks at the flag between layers: tasks already
/// running in the current layer are allowed to finish, and their summaries
/// are kept in the partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next layer boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
