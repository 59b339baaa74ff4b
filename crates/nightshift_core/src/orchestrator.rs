//! # Cycle Orchestrator
//!
//! THE FOREMAN'S SCHEDULE:
//! ```text
//! Cycle k:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. DISPATCH                                                         │
//! │    └─ Fresh CycleGates handed to the producer and all M collectors  │
//! │                                                                     │
//! │ 2. PRODUCTION PHASE (producer)                                      │
//! │    ├─ Draw batch size in [1, 10] and parts from the seeded stream   │
//! │    ├─ Append under the store lock                                   │
//! │    └─ Arrive on production_done                                     │
//! │                                                                     │
//! │ 3. COLLECTION PHASE (M collectors in parallel)                      │
//! │    ├─ Each was parked on production_done                            │
//! │    ├─ Each drains up to its cap                                     │
//! │    └─ Each arrives on collection_done (guaranteed, even on panic)   │
//! │                                                                     │
//! │ 4. CLOSE                                                            │
//! │    ├─ Orchestrator wakes on collection_done                         │
//! │    └─ Worker reports folded into a CycleRecord                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cycle k+1 is not dispatched until step 4 of cycle k. Cycles never overlap.
//!
//! ## Determinism
//!
//! With the same seed and configuration, every run produces the same batches
//! in the same order, and the multiset of parts drained per cycle is the
//! same. Which collector ends up with which part inside a cycle depends on
//! scheduling and is NOT reproducible.

use nightshift_shared::PartKind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::collector::{Collector, CollectorReport};
use crate::config::SimulationConfig;
use crate::crew::{CollectFn, Crew, CycleEvent, CycleEventKind, ProduceFn};
use crate::error::{CycleError, CycleResult, TaskRole};
use crate::store::InventoryStore;
use crate::sync::{CycleGates, LatchOutcome};

/// Where the orchestrator is in its schedule.
///
/// Between calls to [`CycleOrchestrator::step`] this is the phase most
/// recently entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    /// Nothing has run yet.
    Idle,
    /// Producer is working cycle `cycle`.
    Production {
        /// 1-based cycle.
        cycle: usize,
    },
    /// Collectors are working cycle `cycle`.
    Collection {
        /// 1-based cycle.
        cycle: usize,
    },
    /// All cycles ran, or the run stopped on a failure.
    Done,
}

/// What one collector took in one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorDrain {
    /// Collector name.
    pub name: String,
    /// Parts taken, in removal order.
    pub taken: Vec<PartKind>,
}

/// Summary of one completed cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleRecord {
    /// 1-based cycle.
    pub cycle: usize,
    /// The batch produced, in append order.
    pub produced: Vec<PartKind>,
    /// Per-collector drains, in configuration order.
    pub drained: Vec<CollectorDrain>,
    /// Parts left in the store after the cycle.
    pub remaining: usize,
}

impl CycleRecord {
    /// Total parts drained by all collectors this cycle.
    #[must_use]
    pub fn drained_total(&self) -> usize {
        self.drained.iter().map(|d| d.taken.len()).sum()
    }
}

/// Everything a finished run exposes.
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    /// Cycles that completed.
    pub cycles_run: usize,
    /// Final collector state, in configuration order.
    pub collectors: Vec<CollectorReport>,
    /// Per-cycle records. Empty when history recording is off.
    pub history: Vec<CycleRecord>,
    /// Every worker report, in arrival order. Empty when history recording is off.
    pub timeline: Vec<CycleEvent>,
    /// Store contents at the end, head first.
    pub leftover: Vec<PartKind>,
}

impl SimulationOutcome {
    /// Looks up a collector's report by name.
    #[must_use]
    pub fn collector(&self, name: &str) -> Option<&CollectorReport> {
        self.collectors.iter().find(|c| c.name == name)
    }

    /// Parts produced over the recorded history.
    #[must_use]
    pub fn total_produced(&self) -> usize {
        self.history.iter().map(|r| r.produced.len()).sum()
    }

    /// Parts held by all collectors.
    #[must_use]
    pub fn total_collected(&self) -> usize {
        self.collectors.iter().map(|c| c.accumulated.len()).sum()
    }
}

/// Drives N production/collection cycles over a worker crew.
pub struct CycleOrchestrator {
    config: SimulationConfig,
    store: Arc<InventoryStore>,
    crew: Crew,
    phase: CyclePhase,
    completed: usize,
    failed: bool,
    history: Vec<CycleRecord>,
    timeline: Vec<CycleEvent>,
}

impl CycleOrchestrator {
    /// Validates `config` and hires the crew over an empty store.
    ///
    /// # Errors
    ///
    /// [`CycleError::InvalidConfig`] before any thread is started, or
    /// [`CycleError::WorkerSpawn`] if the OS refuses a thread.
    pub fn new(config: SimulationConfig) -> CycleResult<Self> {
        Self::with_store(config, Arc::new(InventoryStore::new()))
    }

    /// Like [`CycleOrchestrator::new`] but over a caller-supplied store.
    ///
    /// # Errors
    ///
    /// As [`CycleOrchestrator::new`].
    pub fn with_store(config: SimulationConfig, store: Arc<InventoryStore>) -> CycleResult<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let produce: ProduceFn = Box::new(move |_: usize, store: &InventoryStore| {
            store.produce_batch(&mut rng)
        });

        let collectors = config
            .collectors
            .iter()
            .map(|c| {
                let work: CollectFn =
                    Box::new(|_: usize, collector: &mut Collector| collector.collect());
                (Collector::new(c.name.clone(), Arc::clone(&store), c.cap), work)
            })
            .collect();

        Self::with_work(config, store, produce, collectors)
    }

    /// Hires the crew with explicit per-cycle work.
    pub(crate) fn with_work(
        config: SimulationConfig,
        store: Arc<InventoryStore>,
        produce: ProduceFn,
        collectors: Vec<(Collector, CollectFn)>,
    ) -> CycleResult<Self> {
        config.validate()?;
        let crew = Crew::hire(&store, produce, collectors)?;

        tracing::info!(
            cycles = config.cycles,
            collectors = config.collector_count(),
            seed = config.seed,
            "orchestrator ready"
        );

        Ok(Self {
            config,
            store,
            crew,
            phase: CyclePhase::Idle,
            completed: 0,
            failed: false,
            history: Vec::new(),
            timeline: Vec::new(),
        })
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Cycles completed so far.
    #[inline]
    #[must_use]
    pub const fn completed_cycles(&self) -> usize {
        self.completed
    }

    /// The configuration this run was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The shared store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    /// Runs one full cycle. Returns `None` once all cycles have run.
    ///
    /// Does not return until every collector of this cycle has arrived.
    ///
    /// # Errors
    ///
    /// [`CycleError::TaskAborted`] if a worker died during the cycle. The
    /// cycle's latches were still released and the orchestrator is finished:
    /// later calls return [`CycleError::CrewDisconnected`].
    pub fn step(&mut self) -> CycleResult<Option<CycleRecord>> {
        if self.failed {
            return Err(CycleError::CrewDisconnected);
        }
        if self.completed >= self.config.cycles {
            self.phase = CyclePhase::Done;
            return Ok(None);
        }

        let cycle = self.completed + 1;
        let gates = CycleGates::new(cycle, self.crew.collector_count());

        self.phase = CyclePhase::Production { cycle };
        let unreachable = self.crew.dispatch(&gates);

        let production = gates.production_done.wait();
        self.phase = CyclePhase::Collection { cycle };
        let collection = gates.collection_done.wait();

        let events = self.crew.drain_events();
        let record = self.fold(cycle, &events);

        if let Some(task) = unreachable.into_iter().next() {
            return Err(self.fail(cycle, task));
        }
        if production == LatchOutcome::Abandoned {
            return Err(self.fail(cycle, TaskRole::Producer));
        }
        if collection == LatchOutcome::Abandoned {
            let task = self.missing_collector(&events).unwrap_or(TaskRole::Producer);
            return Err(self.fail(cycle, task));
        }

        self.completed = cycle;
        if self.config.record_history {
            self.history.push(record.clone());
            self.timeline.extend(events);
        }

        tracing::info!(
            cycle,
            produced = record.produced.len(),
            drained = record.drained_total(),
            remaining = record.remaining,
            "cycle complete"
        );

        if self.completed == self.config.cycles {
            self.phase = CyclePhase::Done;
        }
        Ok(Some(record))
    }

    /// Runs every remaining cycle, then dismisses the crew.
    ///
    /// # Errors
    ///
    /// The first error from [`CycleOrchestrator::step`] or
    /// [`CycleOrchestrator::finish`].
    pub fn run(mut self) -> CycleResult<SimulationOutcome> {
        while self.step()?.is_some() {}
        self.finish()
    }

    /// Dismisses the crew and reports the final state.
    ///
    /// May be called before all cycles have run.
    ///
    /// # Errors
    ///
    /// [`CycleError::TaskAborted`] if a collector's thread had died, since its
    /// holdings are lost.
    pub fn finish(mut self) -> CycleResult<SimulationOutcome> {
        let mut collectors = Vec::with_capacity(self.crew.collector_count());
        for returned in self.crew.dismiss() {
            match returned {
                Ok(collector) => collectors.push(collector.into_report()),
                Err(task) => {
                    return Err(CycleError::TaskAborted {
                        cycle: self.completed + 1,
                        task,
                    })
                }
            }
        }
        self.phase = CyclePhase::Done;

        for report in &collectors {
            tracing::debug!(
                collector = %report.name,
                complete_sets = report.completion_count,
                parts = report.accumulated.len(),
                "collector final state"
            );
        }

        Ok(SimulationOutcome {
            cycles_run: self.completed,
            collectors,
            history: std::mem::take(&mut self.history),
            timeline: std::mem::take(&mut self.timeline),
            leftover: self.store.snapshot(),
        })
    }

    fn fold(&self, cycle: usize, events: &[CycleEvent]) -> CycleRecord {
        let mut produced = Vec::new();
        let mut drained: Vec<CollectorDrain> = (0..self.crew.collector_count())
            .map(|i| CollectorDrain {
                name: self.collector_name(i),
                taken: Vec::new(),
            })
            .collect();

        for event in events.iter().filter(|e| e.cycle == cycle) {
            match &event.kind {
                CycleEventKind::ProductionFinished { produced: batch } => {
                    produced.clone_from(batch);
                }
                CycleEventKind::CollectionFinished { collector, taken } => {
                    if let Some(slot) = drained.get_mut(*collector) {
                        slot.taken.clone_from(taken);
                    }
                }
                _ => {}
            }
        }

        CycleRecord {
            cycle,
            produced,
            drained,
            remaining: self.store.len(),
        }
    }

    fn collector_name(&self, index: usize) -> String {
        match self.crew.collector_role(index) {
            Some(TaskRole::Collector(name)) => name.clone(),
            _ => format!("collector-{}", index + 1),
        }
    }

    /// The first collector that started draining but never reported back.
    fn missing_collector(&self, events: &[CycleEvent]) -> Option<TaskRole> {
        (0..self.crew.collector_count()).find_map(|index| {
            let started = events.iter().any(|e| {
                matches!(e.kind, CycleEventKind::CollectionStarted { collector } if collector == index)
            });
            let finished = events.iter().any(|e| {
                matches!(e.kind, CycleEventKind::CollectionFinished { collector, .. } if collector == index)
            });
            (started && !finished).then(|| TaskRole::Collector(self.collector_name(index)))
        })
    }

    fn fail(&mut self, cycle: usize, task: TaskRole) -> CycleError {
        tracing::warn!(cycle, task = %task, "cycle aborted");
        self.failed = true;
        self.phase = CyclePhase::Done;
        CycleError::TaskAborted { cycle, task }
    }
}
