//! Lifetime handle for a view model instance.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared switch the UI can flip without waiting on an in-flight load.
///
/// A load records the generation it started under; if the generation moves
/// on or the view is discarded before the backend answers, the results are
/// dropped instead of being written into a screen nobody is looking at.
#[derive(Debug, Clone, Default)]
pub struct ViewHandle {
    generation: Arc<AtomicU64>,
    discarded: Arc<AtomicBool>,
}

impl ViewHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load and return its ticket. Older tickets become stale.
    pub fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invalidate every outstanding ticket.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Mark the view as unmounted. Irreversible.
    pub fn discard(&self) {
        self.discarded.store(true, Ordering::SeqCst);
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded.load(Ordering::SeqCst)
    }

    /// Whether results for `ticket` may still be applied.
    pub fn is_current(&self, ticket: u64) -> bool {
        !self.is_discarded() && self.generation.load(Ordering::SeqCst) == ticket
    }
}
