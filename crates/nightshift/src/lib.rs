//! # NIGHTSHIFT Runner
//!
//! Glue between the command line and the cycle engine.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use nightshift_core::{CycleOrchestrator, CycleResult, SimulationConfig, SimulationOutcome};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global fmt subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

/// Reads the config at `path`, or the defaults when `path` is `None`.
///
/// # Errors
///
/// Any read, parse or validation error from the config loader.
pub fn load_config(path: Option<&Path>) -> CycleResult<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::from_toml_file(path),
        None => {
            let config = SimulationConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Runs a full simulation and logs each collector's final holdings.
///
/// # Errors
///
/// Any construction or cycle error from the engine.
pub fn simulate(config: SimulationConfig) -> CycleResult<SimulationOutcome> {
    let outcome = CycleOrchestrator::new(config)?.run()?;

    tracing::info!(
        cycles = outcome.cycles_run,
        produced = outcome.total_produced(),
        collected = outcome.total_collected(),
        leftover = outcome.leftover.len(),
        "simulation finished"
    );
    Ok(outcome)
}
