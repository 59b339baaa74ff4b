//! # Synchronization Primitives for the Cycle
//!
//! FOREMAN'S ORDER: No collector sees a half-made batch. No new day starts
//! while anyone is still collecting.
//!
//! ## The Problem
//!
//! ```text
//! Producer:    append batch k+1
//! Collector:   drain batch k
//!
//! Without ordering: parts from two days mix → run depends on scheduling
//! ```
//!
//! ## The Solution: Two Latches per Cycle
//!
//! ```text
//! Cycle k:
//!   Producer appends       ──> production_done (1 arrival)  ──> collectors wake
//!   Collectors drain (∥)   ──> collection_done (M arrivals) ──> orchestrator wakes
//! Cycle k+1:
//!   fresh latches
//! ```

mod guard;
mod latch;

pub use guard::ArrivalGuard;
pub use latch::{LatchOutcome, PhaseLatch};

use std::sync::Arc;

/// The two latches that order one cycle.
#[derive(Clone, Debug)]
pub struct CycleGates {
    /// 1-based cycle these gates belong to.
    pub cycle: usize,
    /// Opens when production has committed its batch.
    pub production_done: Arc<PhaseLatch>,
    /// Opens when every collector has drained.
    pub collection_done: Arc<PhaseLatch>,
}

impl CycleGates {
    /// Fresh gates for `cycle` with `collectors` expected collection arrivals.
    #[must_use]
    pub fn new(cycle: usize, collectors: usize) -> Self {
        Self {
            cycle,
            production_done: Arc::new(PhaseLatch::new(1)),
            collection_done: Arc::new(PhaseLatch::new(collectors)),
        }
    }
}
