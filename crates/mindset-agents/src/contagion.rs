//! Emotional contagion between agents.
//!
//! A receiver observing a source may catch one of the source's emotions.
//! Contagion happens when `charisma(source) * receptivity(receiver)` reaches
//! the threshold. The caught emotion is either a scaled copy of the detected
//! one or, when a specific emotion to create is given, that emotion.

use mindset_types::Emotion;
use tracing::debug;

use crate::cognitive::CognitiveState;
use crate::snapshot::AgentSnapshot;

/// One contagion attempt.
#[derive(Debug, Clone)]
pub struct Contagion {
    /// Emotion to look for in the source.
    pub detected: Emotion,
    /// Emotion to create instead of copying the detected one.
    pub created: Option<Emotion>,
    /// Overrides the source's charisma.
    pub charisma: Option<f64>,
    /// Overrides the receiver's receptivity.
    pub receptivity: Option<f64>,
    /// Overrides the configured threshold.
    pub threshold: Option<f64>,
    /// Decay of the caught emotion, clamped to `[0, 1]`.
    pub decay: Option<f64>,
    /// Intensity of a created emotion, clamped to `[0, 1]`.
    pub intensity: Option<f64>,
}

impl Contagion {
    /// Copy `detected` when it is found.
    pub const fn of(detected: Emotion) -> Self {
        Self {
            detected,
            created: None,
            charisma: None,
            receptivity: None,
            threshold: None,
            decay: None,
            intensity: None,
        }
    }

    /// Create `created` when `detected` is found.
    #[must_use]
    pub fn creating(mut self, created: Emotion) -> Self {
        self.created = Some(created);
        self
    }

    /// Builder: override the threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Attempt `contagion` from `source` to `receiver`.
///
/// Returns `true` if an emotion was caught.
pub fn spread(
    receiver: &mut CognitiveState,
    source: &AgentSnapshot,
    contagion: &Contagion,
    default_threshold: f64,
) -> bool {
    let Some(held) = source
        .emotions
        .iter()
        .find(|emotion| emotion.same_as(&contagion.detected))
    else {
        return false;
    };
    let charisma = contagion.charisma.unwrap_or(source.charisma);
    let receptivity = contagion
        .receptivity
        .unwrap_or(receiver.dispositions.receptivity);
    let threshold = contagion.threshold.unwrap_or(default_threshold);
    let susceptibility = charisma * receptivity;
    if susceptibility < threshold {
        return false;
    }

    let decay = contagion.decay.map(|d| d.clamp(0.0, 1.0));
    let caught = match &contagion.created {
        Some(created) => {
            let mut emotion = created.clone();
            emotion.decay = decay.unwrap_or(held.decay);
            if let Some(intensity) = contagion.intensity {
                emotion.intensity = Some(intensity.clamp(0.0, 1.0));
            }
            emotion
        }
        None => {
            let mut emotion = held.clone();
            emotion.intensity = held.intensity.map(|i| i * susceptibility);
            emotion.decay = decay.unwrap_or(held.decay);
            emotion
        }
    };
    let caught = Emotion {
        agent_cause: Some(source.agent),
        owner: None,
        ..caught
    };
    debug!(
        agent_id = %receiver.owner(),
        source = %source.agent,
        emotion = %caught,
        "emotion caught"
    );
    receiver.add_emotion(caught)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_types::{AgentId, EmotionKind, Predicate};

    use super::*;
    use crate::config::{CognitionTunables, EngineConfig};
    use crate::norms::NormBook;

    fn receiver(receptivity: f64) -> CognitiveState {
        let mut state = CognitiveState::new(
            AgentId::new(),
            EngineConfig::default(),
            &CognitionTunables::default(),
        );
        state.dispositions.receptivity = receptivity;
        state
    }

    fn source(charisma: f64, emotions: Vec<Emotion>) -> AgentSnapshot {
        AgentSnapshot {
            agent: AgentId::new(),
            emotions,
            charisma,
            norms: NormBook::new(),
            obligations: Vec::new(),
        }
    }

    fn fear() -> Emotion {
        Emotion::new(EmotionKind::Fear).about(Predicate::new("fire"))
    }

    #[test]
    fn copy_scales_intensity_and_credits_source() {
        let mut r = receiver(0.5);
        let s = source(0.8, vec![fear().with_intensity(0.5).with_decay(0.1)]);
        assert!(spread(&mut r, &s, &Contagion::of(fear()), 0.25));
        let caught = r.emotions().first_of_kind(&EmotionKind::Fear).unwrap();
        assert!((caught.intensity.unwrap() - 0.2).abs() < 1e-9);
        assert!((caught.decay - 0.1).abs() < 1e-9);
        assert_eq!(caught.agent_cause, Some(s.agent));
    }

    #[test]
    fn below_threshold_nothing_spreads() {
        let mut r = receiver(0.2);
        let s = source(0.5, vec![fear()]);
        assert!(!spread(&mut r, &s, &Contagion::of(fear()), 0.25));
        assert!(r.emotions().is_empty());
    }

    #[test]
    fn missing_emotion_nothing_spreads() {
        let mut r = receiver(1.0);
        let s = source(1.0, vec![Emotion::new(EmotionKind::Joy)]);
        assert!(!spread(&mut r, &s, &Contagion::of(fear()), 0.25));
    }

    #[test]
    fn created_emotion_uses_clamped_overrides() {
        let mut r = receiver(1.0);
        let s = source(1.0, vec![fear().with_decay(0.3)]);
        let mut contagion = Contagion::of(fear()).creating(Emotion::new(EmotionKind::Anger));
        contagion.intensity = Some(1.7);
        assert!(spread(&mut r, &s, &contagion, 0.25));
        let anger = r.emotions().first_of_kind(&EmotionKind::Anger).unwrap();
        assert!((anger.intensity.unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((anger.decay - 0.3).abs() < 1e-9);
        assert_eq!(anger.agent_cause, Some(s.agent));
    }

    #[test]
    fn threshold_override_applies() {
        let mut r = receiver(0.1);
        let s = source(1.0, vec![fear()]);
        let contagion = Contagion::of(fear()).with_threshold(0.05);
        assert!(spread(&mut r, &s, &contagion, 0.25));
        assert!(r.emotions().first_of_kind(&EmotionKind::Fear).unwrap().intensity.is_none());
    }
}
