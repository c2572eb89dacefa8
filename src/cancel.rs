//! Cooperative cancellation.  One flag is shared, via cheap clones,
//! between the party that requests cancellation and the workers that
//! poll for it between units of work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-way latch: once set it stays set.  Cloning a flag yields a
/// second handle onto the same latch, which is how a render session
/// hands the flag to every one of its workers.  Setting it is idempotent
/// and fire-and-forget; there is no way to un-cancel.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh flag in the not-cancelled state.
    pub fn new() -> CancelFlag {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation.  Safe to call from any thread, any number
    /// of times.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once `cancel` has been called on any clone of this flag.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
