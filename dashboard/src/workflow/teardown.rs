//! Teardown signalling for pending operations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag marking that the owning view has been discarded
///
/// Clones observe the same flag. Every pending continuation checks it
/// before applying a result; requests already on the wire are left to
/// finish and their responses are dropped.
#[derive(Debug, Clone, Default)]
pub struct TeardownToken {
    cancelled: Arc<AtomicBool>,
}

impl TeardownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
