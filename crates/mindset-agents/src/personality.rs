//! Behavioural dispositions derived from personality.
//!
//! When personality is enabled these are recomputed from the OCEAN traits
//! at the start of every tick:
//!
//! ```text
//! charisma          = extraversion
//! receptivity       = 1 - neuroticism
//! plan persistence  = sqrt(conscientiousness)
//! intent persistence= sqrt(conscientiousness)
//! obedience         = sqrt((conscientiousness + agreeableness) / 2)
//! ```
//!
//! Otherwise they keep whatever value the modeler assigned (default 1.0).

use mindset_types::Personality;
use serde::{Deserialize, Serialize};

const fn one() -> f64 {
    1.0
}

/// Dispositions consulted by deliberation, norms and contagion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dispositions {
    /// Strength with which this agent's emotions spread to others.
    #[serde(default = "one")]
    pub charisma: f64,
    /// Susceptibility to other agents' emotions.
    #[serde(default = "one")]
    pub receptivity: f64,
    /// Probability of keeping the current plan each tick.
    #[serde(default = "one")]
    pub plan_persistence: f64,
    /// Probability of keeping the current intention each tick.
    #[serde(default = "one")]
    pub intention_persistence: f64,
    /// Willingness to follow norms and laws.
    #[serde(default = "one")]
    pub obedience: f64,
}

impl Default for Dispositions {
    fn default() -> Self {
        Self {
            charisma: 1.0,
            receptivity: 1.0,
            plan_persistence: 1.0,
            intention_persistence: 1.0,
            obedience: 1.0,
        }
    }
}

impl Dispositions {
    /// Derive dispositions from OCEAN traits.
    pub fn from_personality(personality: &Personality) -> Self {
        let persistence = personality.conscientiousness.sqrt();
        Self {
            charisma: personality.extraversion,
            receptivity: 1.0 - personality.neuroticism,
            plan_persistence: persistence,
            intention_persistence: persistence,
            obedience: ((personality.conscientiousness + personality.agreeableness) * 0.5).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_personality_dispositions() {
        let d = Dispositions::from_personality(&Personality::default());
        assert!((d.charisma - 0.5).abs() < 1e-9);
        assert!((d.receptivity - 0.5).abs() < 1e-9);
        assert!((d.plan_persistence - 0.5_f64.sqrt()).abs() < 1e-9);
        assert!((d.obedience - 0.5_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn conscientious_agents_persist() {
        let p = Personality::new(0.5, 1.0, 0.9, 1.0, 0.0);
        let d = Dispositions::from_personality(&p);
        assert!((d.intention_persistence - 1.0).abs() < 1e-9);
        assert!((d.obedience - 1.0).abs() < 1e-9);
        assert!((d.receptivity - 1.0).abs() < 1e-9);
        assert!((d.charisma - 0.9).abs() < 1e-9);
    }
}
