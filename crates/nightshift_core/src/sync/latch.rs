//! # Phase Latch
//!
//! Wait for exactly N arrivals, then release every waiter.
//!
//! ```text
//!   arrive() ──┐
//!   arrive() ──┼──> [ remaining: N → 0 ] ──> wait() returns Released
//!   arrive() ──┘
//!
//!   abandon() ─────> [ abandoned ] ────────> wait() returns Abandoned
//! ```
//!
//! A latch is single-use. The orchestrator builds a fresh pair every cycle,
//! so a late arrival can never leak into the next cycle's count.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// How a wait on a [`PhaseLatch`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatchOutcome {
    /// Every expected arrival came in.
    Released,
    /// A participant died; the phase it guarded did not complete.
    Abandoned,
}

#[derive(Debug)]
struct LatchState {
    remaining: usize,
    abandoned: bool,
}

/// Countdown barrier built on `parking_lot`.
#[derive(Debug)]
pub struct PhaseLatch {
    state: Mutex<LatchState>,
    open: Condvar,
}

impl PhaseLatch {
    /// Creates a latch that opens after `count` arrivals.
    ///
    /// A zero-count latch is open from the start.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            state: Mutex::new(LatchState {
                remaining: count,
                abandoned: false,
            }),
            open: Condvar::new(),
        }
    }

    /// Records one arrival. Arrivals past zero are ignored.
    pub fn arrive(&self) {
        let mut state = self.state.lock();
        if state.remaining == 0 {
            return;
        }
        state.remaining -= 1;
        if state.remaining == 0 {
            self.open.notify_all();
        }
    }

    /// Marks the phase as failed.
    ///
    /// Waiters see [`LatchOutcome::Abandoned`] once the count reaches zero.
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        state.abandoned = true;
        self.open.notify_all();
    }

    /// Arrivals still outstanding.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.lock().remaining
    }

    /// Returns true if the latch has been abandoned.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.state.lock().abandoned
    }

    /// Blocks until every arrival is in.
    ///
    /// An abandoned latch still waits for the full count: an abandoning
    /// participant arrives as well, so the count always reaches zero.
    pub fn wait(&self) -> LatchOutcome {
        let mut state = self.state.lock();
        while state.remaining > 0 {
            self.open.wait(&mut state);
        }
        Self::outcome(&state)
    }

    /// Like [`PhaseLatch::wait`] but gives up after `timeout`.
    ///
    /// Returns `None` if the latch was still closed when time ran out.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<LatchOutcome> {
        let mut state = self.state.lock();
        if state.remaining > 0 {
            let result = self
                .open
                .wait_while_for(&mut state, |s| s.remaining > 0, timeout);
            if result.timed_out() && state.remaining > 0 {
                return None;
            }
        }
        Some(Self::outcome(&state))
    }

    fn outcome(state: &LatchState) -> LatchOutcome {
        if state.abandoned {
            LatchOutcome::Abandoned
        } else {
            LatchOutcome::Released
        }
    }
}
