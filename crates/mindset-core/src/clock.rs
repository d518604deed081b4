//! Simulation clock for the Mindset engine.
//!
//! The clock is the single source of truth for simulated time. It counts
//! ticks and carries the time step (simulated seconds per tick) that the
//! emotion decay formulas scale by.
//!
//! # Design Principles
//!
//! - The tick counter uses checked arithmetic (no silent overflow).
//! - The time step is validated once at construction; every agent reads
//!   the same value during a tick.

use crate::config::TimeConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. a zero or negative time step).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Monotonic simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,

    /// Simulated seconds per tick.
    time_step: f64,
}

impl SimulationClock {
    /// Create a clock at tick 0 from a time configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the time step is not a
    /// positive finite number.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, config.time_step)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// resuming a run).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `time_step` is not a
    /// positive finite number.
    pub fn from_parts(tick: u64, time_step: f64) -> Result<Self, ClockError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("time_step must be positive and finite, got {time_step}"),
            });
        }
        Ok(Self { tick, time_step })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the simulated seconds per tick.
    pub const fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Simulated seconds elapsed since tick 0.
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 * self.time_step
    }
}
