//! # NIGHTSHIFT Cycle Engine
//!
//! A shared inventory is restocked once per day and drained by several
//! collectors in parallel every night, for a fixed number of days.
//!
//! ## Architecture Rules
//!
//! 1. **One lock, one queue** - The store is the only shared resource
//! 2. **Two latches per cycle** - Production strictly precedes collection,
//!    collection strictly precedes the next production
//! 3. **Hired once** - Worker threads live for the whole run
//! 4. **One seed** - Production is reproducible item for item
//!
//! ## Example
//!
//! ```rust,no_run
//! use nightshift_core::{CycleOrchestrator, SimulationConfig};
//!
//! let outcome = CycleOrchestrator::new(SimulationConfig::default())?.run()?;
//! for collector in &outcome.collectors {
//!     println!("{}: {} complete sets", collector.name, collector.completion_count);
//! }
//! # Ok::<(), nightshift_core::CycleError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collector;
pub mod config;
pub mod crew;
pub mod error;
pub mod orchestrator;
pub mod store;
pub mod sync;

pub use collector::{Collector, CollectorReport};
pub use config::{CollectorConfig, SimulationConfig};
pub use crew::{CycleEvent, CycleEventKind};
pub use error::{CycleError, CycleResult, TaskRole};
pub use orchestrator::{CollectorDrain, CycleOrchestrator, CyclePhase, CycleRecord, SimulationOutcome};
pub use store::InventoryStore;
pub use sync::{ArrivalGuard, CycleGates, LatchOutcome, PhaseLatch};

pub use nightshift_shared::{PartKind, PartTally};
