//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every missing key takes its default.
//!
//! ```toml
//! cycles = 100
//! seed = 42
//!
//! [[collectors]]
//! name = "World"
//! cap = 5
//!
//! [[collectors]]
//! name = "Wednesday"
//! cap = 5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CycleError, CycleResult};

/// Default number of cycles.
pub const DEFAULT_CYCLES: usize = 100;

/// Default per-collector cap.
pub const DEFAULT_CAP: usize = 5;

/// One collector's settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Identity label. Must be unique within a simulation.
    pub name: String,
    /// Maximum parts drained per cycle.
    #[serde(default = "default_cap")]
    pub cap: usize,
}

impl CollectorConfig {
    /// Creates a collector entry.
    #[must_use]
    pub fn new(name: impl Into<String>, cap: usize) -> Self {
        Self {
            name: name.into(),
            cap,
        }
    }
}

/// Full simulation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of production/collection cycles.
    pub cycles: usize,
    /// Seed for the production RNG.
    pub seed: u64,
    /// Keep per-cycle records and the phase timeline.
    pub record_history: bool,
    /// The collectors, one worker each.
    pub collectors: Vec<CollectorConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            seed: 0,
            record_history: true,
            collectors: vec![
                CollectorConfig::new("World", DEFAULT_CAP),
                CollectorConfig::new("Wednesday", DEFAULT_CAP),
            ],
        }
    }
}

fn default_cap() -> usize {
    DEFAULT_CAP
}

impl SimulationConfig {
    /// `count` identical collectors named `collector-1..=count`.
    #[must_use]
    pub fn uniform(cycles: usize, count: usize, cap: usize, seed: u64) -> Self {
        Self {
            cycles,
            seed,
            record_history: true,
            collectors: (1..=count)
                .map(|i| CollectorConfig::new(format!("collector-{i}"), cap))
                .collect(),
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`CycleError::ConfigParse`] on malformed TOML,
    /// [`CycleError::InvalidConfig`] if validation fails.
    pub fn from_toml_str(text: &str) -> CycleResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CycleError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`CycleError::ConfigRead`] if the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> CycleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CycleError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Number of collectors (M).
    #[inline]
    #[must_use]
    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Checks every field. Nothing is started on failure.
    ///
    /// # Errors
    ///
    /// [`CycleError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> CycleResult<()> {
        if self.cycles == 0 {
            return Err(CycleError::InvalidConfig(
                "cycles must be positive".to_string(),
            ));
        }
        if self.collectors.is_empty() {
            return Err(CycleError::InvalidConfig(
                "at least one collector is required".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.collectors.len());
        for collector in &self.collectors {
            if collector.name.trim().is_empty() {
                return Err(CycleError::InvalidConfig(
                    "collector name must not be empty".to_string(),
                ));
            }
            if collector.cap == 0 {
                return Err(CycleError::InvalidConfig(format!(
                    "collector '{}' cap must be positive",
                    collector.name
                )));
            }
            if !seen.insert(collector.name.as_str()) {
                return Err(CycleError::InvalidConfig(format!(
                    "duplicate collector name '{}'",
                    collector.name
                )));
            }
        }
        Ok(())
    }
}
