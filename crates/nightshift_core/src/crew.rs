//! # Worker Crew
//!
//! Threads are hired once and reused every cycle.
//!
//! ```text
//!                    ┌──────────────┐
//!   Orchestrator ───>│ orders (1:1) │──> producer      (owns the RNG stream)
//!        │           │              │──> collector 1   (owns Collector 1)
//!        │           │              │──> collector M   (owns Collector M)
//!        │           └──────────────┘          │
//!        └────────<──── events (M:1) ───<──────┘
//! ```
//!
//! Each collector worker is the sole owner of its `Collector`, so a single
//! collector can never drain twice at once. On shutdown the collectors come
//! back through the join handles.

use crossbeam_channel::{unbounded, Receiver, Sender};
use nightshift_shared::PartKind;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::collector::Collector;
use crate::error::{CycleError, CycleResult, TaskRole};
use crate::store::InventoryStore;
use crate::sync::{ArrivalGuard, CycleGates, LatchOutcome};

/// Production work for one cycle: gets the 1-based cycle and the store.
pub(crate) type ProduceFn = Box<dyn FnMut(usize, &InventoryStore) -> Vec<PartKind> + Send>;

/// Collection work for one cycle: gets the 1-based cycle and the collector.
pub(crate) type CollectFn = Box<dyn FnMut(usize, &mut Collector) -> usize + Send>;

/// What a worker reports while working a shift.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleEventKind {
    /// Producer picked up its shift.
    ProductionStarted,
    /// Producer committed its batch.
    ProductionFinished {
        /// The committed batch, in append order.
        produced: Vec<PartKind>,
    },
    /// A collector passed the production latch and is about to drain.
    CollectionStarted {
        /// Collector position in the configuration.
        collector: usize,
    },
    /// A collector finished draining.
    CollectionFinished {
        /// Collector position in the configuration.
        collector: usize,
        /// Parts taken this cycle, in removal order.
        taken: Vec<PartKind>,
    },
    /// Production was abandoned, so this collector did not drain.
    CollectionSkipped {
        /// Collector position in the configuration.
        collector: usize,
    },
}

/// A timestamped worker report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleEvent {
    /// 1-based cycle.
    pub cycle: usize,
    /// When the worker observed it.
    pub at: Instant,
    /// What happened.
    pub kind: CycleEventKind,
}

/// Commands from the orchestrator.
#[derive(Debug)]
enum Order {
    Shift(CycleGates),
    Shutdown,
}

#[derive(Debug)]
struct Hand<T> {
    role: TaskRole,
    orders: Sender<Order>,
    handle: Option<JoinHandle<T>>,
}

impl<T> Hand<T> {
    fn spawn<F>(role: TaskRole, thread_name: String, body: F) -> CycleResult<Self>
    where
        F: FnOnce(Receiver<Order>) -> T + Send + 'static,
        T: Send + 'static,
    {
        // The worker holds the only receiver: once it dies, sends fail.
        let (orders, inbox) = unbounded();
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || body(inbox))
            .map_err(|e| CycleError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            role,
            orders,
            handle: Some(handle),
        })
    }
}

/// One producer and M collectors, each on its own thread.
pub(crate) struct Crew {
    producer: Option<Hand<()>>,
    collectors: Vec<Hand<Collector>>,
    events: Receiver<CycleEvent>,
}

impl Crew {
    /// Hires the crew. If any hire fails, the already-hired workers are sent
    /// home before the error is returned.
    pub(crate) fn hire(
        store: &Arc<InventoryStore>,
        produce: ProduceFn,
        collectors: Vec<(Collector, CollectFn)>,
    ) -> CycleResult<Self> {
        let (event_tx, event_rx) = unbounded();
        let mut crew = Self {
            producer: None,
            collectors: Vec::with_capacity(collectors.len()),
            events: event_rx,
        };

        let producer = {
            let store = Arc::clone(store);
            let events = event_tx.clone();
            Hand::spawn(
                TaskRole::Producer,
                "nightshift-producer".to_string(),
                move |orders| producer_loop(&store, produce, &orders, &events),
            )?
        };
        crew.producer = Some(producer);

        for (index, (collector, work)) in collectors.into_iter().enumerate() {
            let role = TaskRole::Collector(collector.name().to_string());
            let events = event_tx.clone();
            let hand = Hand::spawn(
                role,
                format!("nightshift-collector-{}", index + 1),
                move |orders| collector_loop(index, collector, work, &orders, &events),
            )?;
            crew.collectors.push(hand);
        }

        tracing::info!(collectors = crew.collectors.len(), "crew hired");
        Ok(crew)
    }

    /// Number of collector workers.
    pub(crate) fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Role of collector `index`.
    pub(crate) fn collector_role(&self, index: usize) -> Option<&TaskRole> {
        self.collectors.get(index).map(|h| &h.role)
    }

    /// Hands every worker its shift for `gates.cycle`.
    ///
    /// A worker that can no longer take orders is stood in for: its latch is
    /// abandoned and arrived on, so waiters on these gates still wake up.
    /// Returns the roles that could not be reached.
    pub(crate) fn dispatch(&self, gates: &CycleGates) -> Vec<TaskRole> {
        let mut unreachable = Vec::new();

        if let Some(producer) = &self.producer {
            if producer.orders.send(Order::Shift(gates.clone())).is_err() {
                ArrivalGuard::new(Arc::clone(&gates.production_done)).abandon();
                unreachable.push(producer.role.clone());
            }
        }
        for hand in &self.collectors {
            if hand.orders.send(Order::Shift(gates.clone())).is_err() {
                ArrivalGuard::new(Arc::clone(&gates.collection_done)).abandon();
                unreachable.push(hand.role.clone());
            }
        }
        unreachable
    }

    /// Everything the workers have reported so far.
    pub(crate) fn drain_events(&self) -> Vec<CycleEvent> {
        self.events.try_iter().collect()
    }

    /// Sends everyone home and takes the collectors back.
    ///
    /// A collector whose thread panicked comes back as its role.
    pub(crate) fn dismiss(&mut self) -> Vec<Result<Collector, TaskRole>> {
        if let Some(producer) = self.producer.as_mut() {
            let _ = producer.orders.send(Order::Shutdown);
        }
        for hand in &self.collectors {
            let _ = hand.orders.send(Order::Shutdown);
        }

        if let Some(handle) = self.producer.as_mut().and_then(|p| p.handle.take()) {
            if handle.join().is_err() {
                tracing::warn!("producer thread had panicked");
            }
        }

        let returned = self
            .collectors
            .iter_mut()
            .filter_map(|hand| {
                let handle = hand.handle.take()?;
                Some(handle.join().map_err(|_| {
                    tracing::warn!(task = %hand.role, "collector thread had panicked");
                    hand.role.clone()
                }))
            })
            .collect();

        tracing::info!("crew dismissed");
        returned
    }
}

impl Drop for Crew {
    fn drop(&mut self) {
        let _ = self.dismiss();
    }
}

fn emit(events: &Sender<CycleEvent>, cycle: usize, kind: CycleEventKind) {
    // The orchestrator owns the receiver for the crew's whole life.
    let _ = events.send(CycleEvent {
        cycle,
        at: Instant::now(),
        kind,
    });
}

fn producer_loop(
    store: &InventoryStore,
    mut produce: ProduceFn,
    orders: &Receiver<Order>,
    events: &Sender<CycleEvent>,
) {
    while let Ok(Order::Shift(gates)) = orders.recv() {
        let guard = ArrivalGuard::new(Arc::clone(&gates.production_done));
        emit(events, gates.cycle, CycleEventKind::ProductionStarted);

        let produced = produce(gates.cycle, store);
        tracing::debug!(cycle = gates.cycle, produced = produced.len(), "day shift done");

        emit(events, gates.cycle, CycleEventKind::ProductionFinished { produced });
        guard.arrive();
    }
}

fn collector_loop(
    index: usize,
    mut collector: Collector,
    mut work: CollectFn,
    orders: &Receiver<Order>,
    events: &Sender<CycleEvent>,
) -> Collector {
    while let Ok(Order::Shift(gates)) = orders.recv() {
        let guard = ArrivalGuard::new(Arc::clone(&gates.collection_done));

        match gates.production_done.wait() {
            LatchOutcome::Released => {
                emit(events, gates.cycle, CycleEventKind::CollectionStarted { collector: index });

                let before = collector.accumulated().len();
                let count = work(gates.cycle, &mut collector);
                let taken = collector.accumulated()[before..].to_vec();
                tracing::debug!(
                    cycle = gates.cycle,
                    collector = collector.name(),
                    taken = count,
                    "night shift done"
                );

                emit(
                    events,
                    gates.cycle,
                    CycleEventKind::CollectionFinished { collector: index, taken },
                );
            }
            LatchOutcome::Abandoned => {
                tracing::warn!(
                    cycle = gates.cycle,
                    collector = collector.name(),
                    "production abandoned, skipping drain"
                );
                emit(events, gates.cycle, CycleEventKind::CollectionSkipped { collector: index });
            }
        }

        guard.arrive();
    }
    collector
}
