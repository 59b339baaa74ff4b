//! # Inventory Store
//!
//! The one resource shared across every worker.
//!
//! ```text
//!   Producer ──> [ tail ... FIFO ... head ] ──> Collector 1
//!                        (one mutex)        ──> Collector 2
//!                                           ──> Collector M
//! ```
//!
//! Every operation takes the lock exactly once. A batch is appended or
//! removed in full under that single acquisition, so no caller ever sees a
//! half-applied produce or drain. The backing queue is never handed out by
//! reference; `snapshot` copies.

use nightshift_shared::PartKind;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;

/// Smallest batch a single production step makes.
pub const MIN_BATCH: usize = 1;

/// Largest batch a single production step makes.
pub const MAX_BATCH: usize = 10;

/// Mutex-guarded FIFO of parts.
#[derive(Debug, Default)]
pub struct InventoryStore {
    parts: Mutex<VecDeque<PartKind>>,
}

impl InventoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: Mutex::new(VecDeque::with_capacity(MAX_BATCH * 4)),
        }
    }

    /// Creates a store preloaded with `parts`, head first.
    #[must_use]
    pub fn with_parts<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = PartKind>,
    {
        Self {
            parts: Mutex::new(parts.into_iter().collect()),
        }
    }

    /// Makes a random batch and appends it. Returns the batch size.
    pub fn produce<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.produce_batch(rng).len()
    }

    /// Makes a random batch, appends it, and returns a copy of it.
    ///
    /// The batch size is uniform in `[MIN_BATCH, MAX_BATCH]` and each part is
    /// uniform over [`PartKind::ALL`]. All draws happen before the lock is
    /// taken, so the RNG stream depends only on the RNG, never on contention.
    pub fn produce_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<PartKind> {
        let count = rng.gen_range(MIN_BATCH..=MAX_BATCH);
        let batch: Vec<PartKind> = (0..count)
            .map(|_| PartKind::ALL[rng.gen_range(0..PartKind::COUNT)])
            .collect();

        let queued = {
            let mut parts = self.parts.lock();
            parts.extend(batch.iter().copied());
            parts.len()
        };

        tracing::debug!(produced = count, queued, "production batch committed");
        batch
    }

    /// Appends a fixed batch. Returns how many parts were added.
    pub fn restock<I>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = PartKind>,
    {
        let mut parts = self.parts.lock();
        let before = parts.len();
        parts.extend(batch);
        parts.len() - before
    }

    /// Removes up to `max_count` parts from the head, in removal order.
    ///
    /// Returns fewer (possibly none) when the store runs short. Never waits
    /// for future production.
    pub fn drain(&self, max_count: usize) -> Vec<PartKind> {
        let (taken, left): (Vec<PartKind>, usize) = {
            let mut parts = self.parts.lock();
            let count = parts.len().min(max_count);
            let taken = parts.drain(..count).collect();
            (taken, parts.len())
        };

        tracing::debug!(requested = max_count, taken = taken.len(), left, "drain");
        taken
    }

    /// Point-in-time copy of the contents, head first.
    ///
    /// Introspection only.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PartKind> {
        self.parts.lock().iter().copied().collect()
    }

    /// Current number of queued parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshift_shared::PartKind::{Feet, Hand, Head, Torso};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_produce_within_bounds() {
        let store = InventoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for _ in 0..200 {
            let before = store.len();
            let count = store.produce(&mut rng);
            assert!((MIN_BATCH..=MAX_BATCH).contains(&count));
            assert_eq!(store.len(), before + count);
        }
    }

    #[test]
    fn test_produce_batch_lands_at_tail() {
        let store = InventoryStore::with_parts([Feet]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let batch = store.produce_batch(&mut rng);
        let snapshot = store.snapshot();

        assert_eq!(snapshot[0], Feet);
        assert_eq!(&snapshot[1..], batch.as_slice());
    }

    #[test]
    fn test_same_seed_same_batches() {
        let a = InventoryStore::new();
        let b = InventoryStore::new();
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            assert_eq!(a.produce_batch(&mut rng_a), b.produce_batch(&mut rng_b));
        }
    }

    #[test]
    fn test_drain_is_fifo() {
        let store = InventoryStore::with_parts([Head, Torso, Hand, Feet, Head]);

        assert_eq!(store.drain(2), vec![Head, Torso]);
        assert_eq!(store.drain(10), vec![Hand, Feet, Head]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_drain_empty_is_not_an_error() {
        let store = InventoryStore::new();
        assert!(store.drain(5).is_empty());
        assert!(store.drain(0).is_empty());
    }

    #[test]
    fn test_restock_appends() {
        let store = InventoryStore::with_parts([Head]);
        assert_eq!(store.restock([Torso, Hand]), 2);
        assert_eq!(store.snapshot(), vec![Head, Torso, Hand]);
    }

    #[test]
    fn test_concurrent_drains_never_overlap() {
        let total = 10_000;
        let store = Arc::new(InventoryStore::with_parts(
            (0..total).map(|i| PartKind::ALL[i % PartKind::COUNT]),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut taken = 0;
                    loop {
                        let batch = store.drain(7);
                        if batch.is_empty() {
                            break taken;
                        }
                        taken += batch.len();
                    }
                })
            })
            .collect();

        let drained: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(drained, total);
        assert!(store.is_empty());
    }
}
