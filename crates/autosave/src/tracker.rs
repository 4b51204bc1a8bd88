//! Generation counter shared between a document's observed fields

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic change counter. Cloning shares the counter; every mutable
/// borrow of an [`Observe`](crate::Observe) field bound to it bumps the
/// generation.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    generation: Arc<AtomicU64>,
}

impl ChangeTracker {
    /// Fresh tracker at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one change.
    pub fn mark(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Whether any change was recorded after `generation`.
    pub fn changed_since(&self, generation: u64) -> bool {
        self.generation() != generation
    }

    /// Whether `other` shares this counter.
    pub fn shares(&self, other: &ChangeTracker) -> bool {
        Arc::ptr_eq(&self.generation, &other.generation)
    }
}
