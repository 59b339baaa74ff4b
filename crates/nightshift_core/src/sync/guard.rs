//! # Arrival Guard
//!
//! Arrives at a latch exactly once, when dropped.
//!
//! A worker takes its guard before doing anything that can fail. Whether the
//! worker finishes normally or unwinds out of a panic, the drop runs and the
//! latch count still reaches zero. On the unwinding path the latch is also
//! marked abandoned so the waiter can tell the phase did not complete.

use std::sync::Arc;

use super::latch::PhaseLatch;

/// RAII arrival on a [`PhaseLatch`].
#[derive(Debug)]
#[must_use = "dropping the guard arrives immediately"]
pub struct ArrivalGuard {
    latch: Arc<PhaseLatch>,
}

impl ArrivalGuard {
    /// Binds a guard to `latch`.
    pub fn new(latch: Arc<PhaseLatch>) -> Self {
        Self { latch }
    }

    /// Arrives now.
    pub fn arrive(self) {
        drop(self);
    }

    /// Marks the latch abandoned, then arrives.
    pub fn abandon(self) {
        self.latch.abandon();
        drop(self);
    }
}

impl Drop for ArrivalGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!("worker unwinding, abandoning phase");
            self.latch.abandon();
        }
        self.latch.arrive();
    }
}
