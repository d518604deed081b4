//! OCEAN personality traits.

use serde::{Deserialize, Serialize};

/// Trait value used when none is configured.
pub const NEUTRAL_TRAIT: f64 = 0.5;

const fn neutral() -> f64 {
    NEUTRAL_TRAIT
}

/// Five-factor personality vector. Every trait lies in `[0, 1]`.
///
/// Personality is fixed for the lifetime of an agent. It feeds the emotion
/// intensity formulas, the social link coefficients and the derived
/// dispositions (charisma, receptivity, persistence, obedience).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Openness to experience.
    #[serde(default = "neutral")]
    pub openness: f64,
    /// Conscientiousness.
    #[serde(default = "neutral")]
    pub conscientiousness: f64,
    /// Extraversion.
    #[serde(default = "neutral")]
    pub extraversion: f64,
    /// Agreeableness.
    #[serde(default = "neutral")]
    pub agreeableness: f64,
    /// Neuroticism.
    #[serde(default = "neutral")]
    pub neuroticism: f64,
}

impl Personality {
    /// Build a personality, clamping every trait into `[0, 1]`.
    pub const fn new(
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
    ) -> Self {
        Self {
            openness: openness.clamp(0.0, 1.0),
            conscientiousness: conscientiousness.clamp(0.0, 1.0),
            extraversion: extraversion.clamp(0.0, 1.0),
            agreeableness: agreeableness.clamp(0.0, 1.0),
            neuroticism: neuroticism.clamp(0.0, 1.0),
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::new(
            NEUTRAL_TRAIT,
            NEUTRAL_TRAIT,
            NEUTRAL_TRAIT,
            NEUTRAL_TRAIT,
            NEUTRAL_TRAIT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_clamped() {
        let p = Personality::new(1.4, -0.2, 0.3, 0.5, 0.9);
        assert!((p.openness - 1.0).abs() < f64::EPSILON);
        assert!(p.conscientiousness.abs() < f64::EPSILON);
        assert!((p.neuroticism - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_traits_deserialize_neutral() {
        let p: Result<Personality, _> = serde_json::from_str(r#"{"openness": 0.1}"#);
        assert!(p.is_ok());
        let p = p.ok().unwrap_or_default();
        assert!((p.openness - 0.1).abs() < f64::EPSILON);
        assert!((p.agreeableness - NEUTRAL_TRAIT).abs() < f64::EPSILON);
    }
}
