//! Directed relationship scores from one agent to another.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// How an agent regards one other agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// The other agent.
    pub agent: AgentId,
    /// Affection, in `[-1, 1]`.
    #[serde(default)]
    pub liking: f64,
    /// Perceived power over the other agent, in `[-1, 1]`.
    #[serde(default)]
    pub dominance: f64,
    /// Perceived like-mindedness, in `[0, 1]`.
    #[serde(default)]
    pub solidarity: f64,
    /// How well the other agent is known, in `[0, 1]`.
    #[serde(default)]
    pub familiarity: f64,
    /// Confidence in the other agent, in `[-1, 1]`.
    #[serde(default)]
    pub trust: f64,
}

impl SocialLink {
    /// Create a neutral link towards `agent`.
    pub const fn new(agent: AgentId) -> Self {
        Self {
            agent,
            liking: 0.0,
            dominance: 0.0,
            solidarity: 0.0,
            familiarity: 0.0,
            trust: 0.0,
        }
    }

    /// Builder: set the liking.
    #[must_use]
    pub const fn with_liking(mut self, liking: f64) -> Self {
        self.liking = liking;
        self
    }

    /// Builder: set the dominance.
    #[must_use]
    pub const fn with_dominance(mut self, dominance: f64) -> Self {
        self.dominance = dominance;
        self
    }

    /// Builder: set the solidarity.
    #[must_use]
    pub const fn with_solidarity(mut self, solidarity: f64) -> Self {
        self.solidarity = solidarity;
        self
    }

    /// Builder: set the familiarity.
    #[must_use]
    pub const fn with_familiarity(mut self, familiarity: f64) -> Self {
        self.familiarity = familiarity;
        self
    }

    /// Builder: set the trust.
    #[must_use]
    pub const fn with_trust(mut self, trust: f64) -> Self {
        self.trust = trust;
        self
    }

    /// True if every score lies inside its documented range.
    pub fn is_within_bounds(&self) -> bool {
        let signed = -1.0..=1.0;
        let unit = 0.0..=1.0;
        signed.contains(&self.liking)
            && signed.contains(&self.dominance)
            && signed.contains(&self.trust)
            && unit.contains(&self.solidarity)
            && unit.contains(&self.familiarity)
    }
}
