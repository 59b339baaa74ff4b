//! # NIGHTSHIFT Simulator
//!
//! ```text
//! nightshift_sim [config.toml]
//! ```
//!
//! Without an argument the built-in defaults run: 100 cycles, two
//! collectors with cap 5, seed 0.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    nightshift::init_logging();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match nightshift::load_config(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };

    match nightshift::simulate(config) {
        Ok(outcome) => {
            for collector in &outcome.collectors {
                tracing::info!(
                    collector = %collector.name,
                    complete_sets = collector.completion_count,
                    parts = collector.accumulated.len(),
                    "final holdings"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
