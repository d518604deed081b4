//! Engine switches and cognition tunables.
//!
//! [`EngineConfig`] carries the five architecture switches that decide which
//! parts of the cycle run. [`CognitionTunables`] bundles the numeric knobs.
//! Both deserialize from the `engine` and `tunables` sections of
//! `mindset-config.yaml`; every field has a default.

use serde::{Deserialize, Serialize};

use crate::error::CognitionError;

/// Architecture switches for one agent's cognitive cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Derive emotion intensities and dispositions from OCEAN traits.
    #[serde(default)]
    pub use_personality: bool,
    /// Run the appraisal rules when beliefs and uncertainties change.
    #[serde(default)]
    pub use_emotion_architecture: bool,
    /// Update social links and emotions about partners each tick.
    #[serde(default)]
    pub use_social_architecture: bool,
    /// Pick intentions and plans by weighted draw instead of by maximum.
    #[serde(default)]
    pub use_probabilistic_choice: bool,
    /// Allow random abandonment of the current intention and plan.
    #[serde(default)]
    pub use_persistence: bool,
}

impl EngineConfig {
    /// Every architecture switched on, deterministic choice.
    pub const fn full() -> Self {
        Self {
            use_personality: true,
            use_emotion_architecture: true,
            use_social_architecture: true,
            use_probabilistic_choice: false,
            use_persistence: true,
        }
    }
}

/// Numeric knobs of the cognitive cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitionTunables {
    /// Number of trace notes kept in the thought log (default: 5).
    #[serde(default = "default_thought_capacity")]
    pub thought_capacity: usize,

    /// Coefficient used by the social link updates when personality is off
    /// (default: 0.1).
    #[serde(default = "default_social_coefficient")]
    pub default_social_coefficient: f64,

    /// Minimum `charisma * receptivity` for an emotion to spread
    /// (default: 0.25).
    #[serde(default = "default_contagion_threshold")]
    pub contagion_threshold: f64,

    /// Upper bound on instantaneous plan iterations within one tick
    /// (default: 100).
    #[serde(default = "default_max_instantaneous_iterations")]
    pub max_instantaneous_iterations: u32,
}

const fn default_thought_capacity() -> usize {
    5
}

const fn default_social_coefficient() -> f64 {
    0.1
}

const fn default_contagion_threshold() -> f64 {
    0.25
}

const fn default_max_instantaneous_iterations() -> u32 {
    100
}

impl Default for CognitionTunables {
    fn default() -> Self {
        Self {
            thought_capacity: default_thought_capacity(),
            default_social_coefficient: default_social_coefficient(),
            contagion_threshold: default_contagion_threshold(),
            max_instantaneous_iterations: default_max_instantaneous_iterations(),
        }
    }
}

impl CognitionTunables {
    /// Check that every knob is usable.
    pub fn validate(&self) -> Result<(), CognitionError> {
        if self.thought_capacity == 0 {
            return Err(CognitionError::InvalidTunable {
                name: "thought_capacity",
                value: self.thought_capacity.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.default_social_coefficient) {
            return Err(CognitionError::InvalidTunable {
                name: "default_social_coefficient",
                value: self.default_social_coefficient.to_string(),
            });
        }
        if !self.contagion_threshold.is_finite() || self.contagion_threshold < 0.0 {
            return Err(CognitionError::InvalidTunable {
                name: "contagion_threshold",
                value: self.contagion_threshold.to_string(),
            });
        }
        if self.max_instantaneous_iterations == 0 {
            return Err(CognitionError::InvalidTunable {
                name: "max_instantaneous_iterations",
                value: self.max_instantaneous_iterations.to_string(),
            });
        }
        Ok(())
    }
}
