//! Emotions held in an agent's emotion base.

use serde::{Deserialize, Serialize};

use crate::enums::EmotionKind;
use crate::ids::AgentId;
use crate::predicate::Predicate;

/// An emotion, optionally about a predicate and caused by an agent.
///
/// `intensity` of `None` means the emotion is present without a tracked
/// intensity. Such emotions never merge and never decay away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emotion {
    /// Which emotion this is.
    pub kind: EmotionKind,
    /// Current intensity in `[0, 1]`, or `None` when untracked.
    #[serde(default)]
    pub intensity: Option<f64>,
    /// Amount subtracted from the intensity each tick.
    #[serde(default)]
    pub decay: f64,
    /// What the emotion is about.
    #[serde(default)]
    pub about: Option<Predicate>,
    /// Agent that caused the emotion.
    #[serde(default)]
    pub agent_cause: Option<AgentId>,
    /// Agent feeling the emotion. Set when added to an emotion base.
    #[serde(default)]
    pub owner: Option<AgentId>,
}

impl Emotion {
    /// Create an emotion with no intensity, decay, payload or cause.
    pub const fn new(kind: EmotionKind) -> Self {
        Self {
            kind,
            intensity: None,
            decay: 0.0,
            about: None,
            agent_cause: None,
            owner: None,
        }
    }

    /// Builder: set the intensity.
    #[must_use]
    pub const fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Builder: set the decay per tick.
    #[must_use]
    pub const fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Builder: set the predicate the emotion is about.
    #[must_use]
    pub fn about(mut self, predicate: Predicate) -> Self {
        self.about = Some(predicate);
        self
    }

    /// Builder: set the causing agent.
    #[must_use]
    pub const fn caused_by(mut self, cause: AgentId) -> Self {
        self.agent_cause = Some(cause);
        self
    }

    /// Identity used by the emotion base: kind, `about` and cause.
    ///
    /// Intensity, decay and owner are ignored. Two emotions about nothing
    /// are about the same thing.
    pub fn same_as(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.agent_cause != other.agent_cause {
            return false;
        }
        match (&self.about, &other.about) {
            (Some(a), Some(b)) => a.equals_emotions(b),
            (None, None) => true,
            _ => false,
        }
    }

    /// True if this emotion is about a predicate matching `predicate`.
    pub fn is_about(&self, predicate: &Predicate) -> bool {
        self.about
            .as_ref()
            .is_some_and(|about| about.equals_emotions(predicate))
    }

    /// Tracked intensity, or `0.0` when untracked.
    pub fn intensity_or_zero(&self) -> f64 {
        self.intensity.unwrap_or(0.0)
    }
}

impl core::fmt::Display for Emotion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(about) = &self.about {
            write!(f, " about {about}")?;
        }
        if let Some(intensity) = self.intensity {
            write!(f, " ({intensity:.3})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_intensity_and_owner() {
        let mut a = Emotion::new(EmotionKind::Joy)
            .with_intensity(0.2)
            .about(Predicate::new("water"));
        let b = Emotion::new(EmotionKind::Joy)
            .with_intensity(0.9)
            .about(Predicate::new("water"));
        a.owner = Some(AgentId::new());
        assert!(a.same_as(&b));
    }

    #[test]
    fn identity_uses_cause_and_about() {
        let cause = AgentId::new();
        let a = Emotion::new(EmotionKind::Joy).caused_by(cause);
        let b = Emotion::new(EmotionKind::Joy);
        assert!(!a.same_as(&b));

        let about_water = Emotion::new(EmotionKind::Joy).about(Predicate::new("water"));
        assert!(!about_water.same_as(&b));
        assert!(!about_water.same_as(&Emotion::new(EmotionKind::Sadness).about(Predicate::new("water"))));
    }

    #[test]
    fn untracked_intensity_reads_as_zero() {
        let fear = Emotion::new(EmotionKind::Fear);
        assert!(fear.intensity.is_none());
        assert!(fear.intensity_or_zero().abs() < f64::EPSILON);
    }

    #[test]
    fn display_includes_payload() {
        let joy = Emotion::new(EmotionKind::Joy)
            .with_intensity(0.5)
            .about(Predicate::new("water"));
        assert_eq!(joy.to_string(), "joy about water(true) (0.500)");
    }
}
