//! # Collectors
//!
//! A collector pulls up to `cap` parts from the shared store per cycle and
//! keeps everything it ever took. Its holdings are never reset mid-run.
//!
//! `collect` takes `&mut self`: one collector can never run two drains at
//! once. Races between different collectors are settled by the store's lock.

use nightshift_shared::{PartKind, PartTally};
use serde::Serialize;
use std::sync::Arc;

use crate::store::InventoryStore;

/// One consumer of the shared store.
#[derive(Debug)]
pub struct Collector {
    name: String,
    store: Arc<InventoryStore>,
    cap: usize,
    accumulated: Vec<PartKind>,
}

impl Collector {
    /// Creates a collector drawing from `store`, at most `cap` parts per call.
    #[must_use]
    pub fn new(name: impl Into<String>, store: Arc<InventoryStore>, cap: usize) -> Self {
        Self {
            name: name.into(),
            store,
            cap,
            accumulated: Vec::new(),
        }
    }

    /// Identity label.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum parts drained per call.
    #[inline]
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Everything collected so far, in collection order.
    #[inline]
    #[must_use]
    pub fn accumulated(&self) -> &[PartKind] {
        &self.accumulated
    }

    /// Drains up to `cap` parts and appends them. Returns how many were taken.
    ///
    /// Zero is a normal outcome when the store is short.
    pub fn collect(&mut self) -> usize {
        let taken = self.store.drain(self.cap);
        let count = taken.len();
        self.accumulated.extend(taken);
        count
    }

    /// Per-kind counts over everything collected so far.
    #[must_use]
    pub fn tally(&self) -> PartTally {
        PartTally::from_parts(&self.accumulated)
    }

    /// Complete sets buildable from all parts collected so far.
    ///
    /// Zero if any kind is missing, otherwise the smallest per-kind count.
    #[must_use]
    pub fn completion_count(&self) -> usize {
        self.tally().complete_sets()
    }

    /// Final state, detached from the store.
    #[must_use]
    pub fn into_report(self) -> CollectorReport {
        CollectorReport {
            completion_count: self.completion_count(),
            name: self.name,
            cap: self.cap,
            accumulated: self.accumulated,
        }
    }
}

/// What a collector ended the run with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectorReport {
    /// Identity label.
    pub name: String,
    /// Configured per-cycle cap.
    pub cap: usize,
    /// Complete sets buildable from `accumulated`.
    pub completion_count: usize,
    /// Every part collected, in order.
    pub accumulated: Vec<PartKind>,
}
