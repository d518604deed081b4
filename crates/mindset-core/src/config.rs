//! Configuration loading and typed config structures for the Mindset engine.
//!
//! The canonical configuration lives in `mindset-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty document is a valid configuration.

use std::path::Path;

use mindset_agents::{CognitionError, CognitionTunables, EngineConfig};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A cognition tunable is out of range.
    #[error("invalid tunables: {source}")]
    Tunables {
        /// The underlying validation error.
        #[from]
        source: CognitionError,
    },

    /// A population or time setting is unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `mindset-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Architecture switches applied to every agent.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Numeric knobs of the cognitive cycle.
    #[serde(default)]
    pub tunables: CognitionTunables,

    /// Run identity and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Time step and run bounds.
    #[serde(default)]
    pub time: TimeConfig,

    /// Population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Tunables`] or [`ConfigError::Invalid`] naming
    /// the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tunables.validate()?;
        if !self.time.time_step.is_finite() || self.time.time_step <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("time.time_step must be positive, got {}", self.time.time_step),
            });
        }
        if self.population.parallel_threshold == 0 {
            return Err(ConfigError::Invalid {
                reason: "population.parallel_threshold must be at least 1".to_owned(),
            });
        }
        if !(0.0..=1.0).contains(&self.population.link_probability) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "population.link_probability must be within [0, 1], got {}",
                    self.population.link_probability
                ),
            });
        }
        Ok(())
    }
}

/// Run identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Time configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Simulated seconds per tick, used by emotion decay.
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Real-time milliseconds to wait between ticks (0 = no wait).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = run until the population is empty).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            tick_interval_ms: 0,
            max_ticks: default_max_ticks(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents to spawn at simulation start.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Population size from which agent ticks run on the blocking pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Chance that a spawned agent starts with a social link to another.
    #[serde(default = "default_link_probability")]
    pub link_probability: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            parallel_threshold: default_parallel_threshold(),
            link_probability: default_link_probability(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Mindset".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_time_step() -> f64 {
    1.0
}

const fn default_max_ticks() -> u64 {
    100
}

const fn default_initial_agents() -> u32 {
    10
}

const fn default_parallel_threshold() -> usize {
    64
}

const fn default_link_probability() -> f64 {
    0.3
}

fn default_log_level() -> String {
    "info".to_owned()
}
