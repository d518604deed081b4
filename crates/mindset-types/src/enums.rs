//! Enumeration types shared across the engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// The store a mental state belongs to.
///
/// Each agent keeps one ordered store per modality. The order of the
/// variants is also the order in which lifetimes are aged each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Something the agent holds to be the case.
    Belief,
    /// Something the agent would like to be the case.
    Desire,
    /// A desire or obligation the agent has committed to pursue.
    Intention,
    /// Something the agent considers possible but unconfirmed.
    Uncertainty,
    /// A standard of behaviour the agent praises or blames.
    Ideal,
    /// Something the agent is required to bring about.
    Obligation,
}

impl Modality {
    /// All modalities, in aging order.
    pub const ALL: [Self; 6] = [
        Self::Belief,
        Self::Desire,
        Self::Intention,
        Self::Uncertainty,
        Self::Ideal,
        Self::Obligation,
    ];

    /// Lowercase name used in logs and thoughts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Belief => "belief",
            Self::Desire => "desire",
            Self::Intention => "intention",
            Self::Uncertainty => "uncertainty",
            Self::Ideal => "ideal",
            Self::Obligation => "obligation",
        }
    }
}

impl core::fmt::Display for Modality {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EmotionKind
// ---------------------------------------------------------------------------

/// Name of an emotion.
///
/// The built-in variants are the ones the appraisal rules derive. Emotions
/// added by trigger statements may use any other name through
/// [`EmotionKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    /// A desired state of affairs is believed.
    Joy,
    /// The opposite of a desired state of affairs is believed.
    Sadness,
    /// A desired state of affairs is possible.
    Hope,
    /// The opposite of a desired state of affairs is possible.
    Fear,
    /// A hoped-for state was confirmed.
    Satisfaction,
    /// A hoped-for state was disconfirmed.
    Disappointment,
    /// A feared state was confirmed.
    FearConfirmed,
    /// A feared state was disconfirmed.
    Relief,
    /// The agent upheld one of its ideals.
    Pride,
    /// The agent fell short of one of its ideals.
    Shame,
    /// Another agent upheld one of this agent's ideals.
    Admiration,
    /// Another agent fell short of one of this agent's ideals.
    Reproach,
    /// Joy about something the agent is proud of.
    Gratification,
    /// Joy about something another agent is admired for.
    Gratitude,
    /// Sadness about something the agent is ashamed of.
    Remorse,
    /// Sadness about something another agent is reproached for.
    Anger,
    /// Joy for a liked agent's joy.
    HappyFor,
    /// Sadness for a liked agent's sadness.
    SorryFor,
    /// Displeasure at a disliked agent's joy.
    Resentment,
    /// Pleasure at a disliked agent's sadness.
    Gloating,
    /// Any other modeler-defined emotion.
    Custom(String),
}

impl EmotionKind {
    /// Return the canonical snake-case name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Hope => "hope",
            Self::Fear => "fear",
            Self::Satisfaction => "satisfaction",
            Self::Disappointment => "disappointment",
            Self::FearConfirmed => "fear_confirmed",
            Self::Relief => "relief",
            Self::Pride => "pride",
            Self::Shame => "shame",
            Self::Admiration => "admiration",
            Self::Reproach => "reproach",
            Self::Gratification => "gratification",
            Self::Gratitude => "gratitude",
            Self::Remorse => "remorse",
            Self::Anger => "anger",
            Self::HappyFor => "happy_for",
            Self::SorryFor => "sorry_for",
            Self::Resentment => "resentment",
            Self::Gloating => "gloating",
            Self::Custom(name) => name,
        }
    }

    /// Parse a name, mapping unknown names to [`EmotionKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "joy" => Self::Joy,
            "sadness" => Self::Sadness,
            "hope" => Self::Hope,
            "fear" => Self::Fear,
            "satisfaction" => Self::Satisfaction,
            "disappointment" => Self::Disappointment,
            "fear_confirmed" => Self::FearConfirmed,
            "relief" => Self::Relief,
            "pride" => Self::Pride,
            "shame" => Self::Shame,
            "admiration" => Self::Admiration,
            "reproach" => Self::Reproach,
            "gratification" => Self::Gratification,
            "gratitude" => Self::Gratitude,
            "remorse" => Self::Remorse,
            "anger" => Self::Anger,
            "happy_for" => Self::HappyFor,
            "sorry_for" => Self::SorryFor,
            "resentment" => Self::Resentment,
            "gloating" => Self::Gloating,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Joy and hope count as positive when weighing a relationship.
    pub const fn is_positive_valence(&self) -> bool {
        matches!(self, Self::Joy | Self::Hope)
    }

    /// Sadness and fear count as negative when weighing a relationship.
    pub const fn is_negative_valence(&self) -> bool {
        matches!(self, Self::Sadness | Self::Fear)
    }
}

impl core::fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_names_roundtrip() {
        for name in ["joy", "fear_confirmed", "happy_for", "gloating"] {
            assert_eq!(EmotionKind::from_name(name).as_str(), name);
        }
        assert_eq!(
            EmotionKind::from_name("nostalgia"),
            EmotionKind::Custom("nostalgia".to_owned())
        );
    }

    #[test]
    fn valence_split() {
        assert!(EmotionKind::Joy.is_positive_valence());
        assert!(EmotionKind::Hope.is_positive_valence());
        assert!(EmotionKind::Fear.is_negative_valence());
        assert!(!EmotionKind::Pride.is_positive_valence());
        assert!(!EmotionKind::Anger.is_negative_valence());
    }

    #[test]
    fn modality_serializes_snake_case() {
        let json = serde_json::to_string(&Modality::Uncertainty).ok();
        assert_eq!(json.as_deref(), Some("\"uncertainty\""));
    }
}
