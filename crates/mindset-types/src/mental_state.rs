//! Mental-state records: the entries of the six modality stores.
//!
//! Links between records (subintentions, on-hold lists, super-intentions)
//! are [`MentalStateId`]s resolved through the owning agent's arena rather
//! than nested copies, so a record can be removed from every list that
//! mentions it without chasing aliases.

use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;
use crate::enums::Modality;
use crate::ids::{AgentId, MentalStateId};
use crate::predicate::Predicate;

/// Strength given to a mental state when none is specified.
pub const DEFAULT_STRENGTH: f64 = 1.0;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// What a mental state is about. Exactly one kind per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Payload {
    /// A proposition.
    Predicate(Predicate),
    /// Another agent's (or this agent's) mental state, e.g. a belief about
    /// someone's desire.
    MentalState(Box<MentalState>),
    /// An emotion, e.g. a belief that a partner feels joy.
    Emotion(Emotion),
}

impl Payload {
    /// Payload equality as used by the stores.
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Predicate(a), Self::Predicate(b)) => a.equals(b),
            (Self::MentalState(a), Self::MentalState(b)) => a.equals(b),
            (Self::Emotion(a), Self::Emotion(b)) => a.same_as(b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// MentalState
// ---------------------------------------------------------------------------

/// One entry of a modality store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalState {
    /// Store this record belongs to.
    pub modality: Modality,
    /// What the record is about.
    pub payload: Payload,
    /// Priority weight. Negative means unset.
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Remaining ticks before eviction. `None` lives forever.
    #[serde(default)]
    pub lifetime: Option<u32>,
    /// Agent holding the record. Assigned when the record is stored.
    #[serde(default)]
    pub owner: Option<AgentId>,
    /// Desires added as sub-goals of this record.
    #[serde(default)]
    pub subintentions: Vec<MentalStateId>,
    /// Desires this intention waits on before it may be executed.
    #[serde(default)]
    pub on_hold_until: Option<Vec<MentalStateId>>,
    /// Record this one was added as a sub-goal of.
    #[serde(default)]
    pub super_intention: Option<MentalStateId>,
}

const fn default_strength() -> f64 {
    DEFAULT_STRENGTH
}

impl MentalState {
    /// Create a record about `payload` with default strength and infinite
    /// lifetime.
    pub const fn new(modality: Modality, payload: Payload) -> Self {
        Self {
            modality,
            payload,
            strength: DEFAULT_STRENGTH,
            lifetime: None,
            owner: None,
            subintentions: Vec::new(),
            on_hold_until: None,
            super_intention: None,
        }
    }

    /// Create a record about a predicate.
    pub const fn about(modality: Modality, predicate: Predicate) -> Self {
        Self::new(modality, Payload::Predicate(predicate))
    }

    /// Shorthand for a belief about `predicate`.
    pub const fn belief(predicate: Predicate) -> Self {
        Self::about(Modality::Belief, predicate)
    }

    /// Shorthand for a desire about `predicate`.
    pub const fn desire(predicate: Predicate) -> Self {
        Self::about(Modality::Desire, predicate)
    }

    /// Shorthand for an uncertainty about `predicate`.
    pub const fn uncertainty(predicate: Predicate) -> Self {
        Self::about(Modality::Uncertainty, predicate)
    }

    /// Shorthand for an ideal about `predicate`.
    pub const fn ideal(predicate: Predicate) -> Self {
        Self::about(Modality::Ideal, predicate)
    }

    /// Shorthand for an obligation about `predicate`.
    pub const fn obligation(predicate: Predicate) -> Self {
        Self::about(Modality::Obligation, predicate)
    }

    /// Builder: set the strength.
    #[must_use]
    pub const fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Builder: set a finite lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: u32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Builder: set the owner.
    #[must_use]
    pub const fn owned_by(mut self, owner: AgentId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Return a copy of this record moved to another modality, with all
    /// links cleared.
    #[must_use]
    pub fn as_modality(&self, modality: Modality) -> Self {
        Self {
            modality,
            payload: self.payload.clone(),
            strength: self.strength,
            lifetime: self.lifetime,
            owner: self.owner,
            subintentions: Vec::new(),
            on_hold_until: None,
            super_intention: None,
        }
    }

    /// The predicate payload, if this record is about a predicate.
    pub const fn predicate(&self) -> Option<&Predicate> {
        match &self.payload {
            Payload::Predicate(predicate) => Some(predicate),
            _ => None,
        }
    }

    /// The embedded mental state, if any.
    pub fn embedded(&self) -> Option<&Self> {
        match &self.payload {
            Payload::MentalState(state) => Some(state),
            _ => None,
        }
    }

    /// The embedded emotion, if any.
    pub const fn emotion(&self) -> Option<&Emotion> {
        match &self.payload {
            Payload::Emotion(emotion) => Some(emotion),
            _ => None,
        }
    }

    /// True if a strength has been set.
    pub fn has_strength(&self) -> bool {
        self.strength >= 0.0
    }

    /// Store equality: equal payloads and, when both are set, equal owners.
    ///
    /// Strength, lifetime, modality and links do not take part.
    pub fn equals(&self, other: &Self) -> bool {
        match (self.owner, other.owner) {
            (Some(a), Some(b)) if a != b => false,
            _ => self.payload.equals(&other.payload),
        }
    }

    /// True if the predicate payload matches `predicate` by full equality.
    pub fn is_about(&self, predicate: &Predicate) -> bool {
        self.predicate().is_some_and(|own| own.equals(predicate))
    }
}

impl core::fmt::Display for MentalState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(", self.modality)?;
        match &self.payload {
            Payload::Predicate(predicate) => write!(f, "{predicate}")?,
            Payload::MentalState(state) => write!(f, "{state}")?,
            Payload::Emotion(emotion) => write!(f, "{emotion}")?,
        }
        write!(f, ", {:.3})", self.strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EmotionKind;

    #[test]
    fn equality_ignores_strength_lifetime_and_modality() {
        let a = MentalState::belief(Predicate::new("water")).with_strength(0.2);
        let b = MentalState::desire(Predicate::new("water")).with_lifetime(3);
        assert!(a.equals(&b));
    }

    #[test]
    fn owners_must_agree_when_both_set() {
        let a = MentalState::belief(Predicate::new("water")).owned_by(AgentId::new());
        let b = MentalState::belief(Predicate::new("water")).owned_by(AgentId::new());
        let unowned = MentalState::belief(Predicate::new("water"));
        assert!(!a.equals(&b));
        assert!(a.equals(&unowned));
    }

    #[test]
    fn payload_kinds_never_match_each_other() {
        let pred = MentalState::belief(Predicate::new("joy"));
        let emo = MentalState::new(
            Modality::Belief,
            Payload::Emotion(Emotion::new(EmotionKind::Joy)),
        );
        assert!(!pred.equals(&emo));
        assert!(pred.predicate().is_some());
        assert!(emo.emotion().is_some());
        assert!(emo.predicate().is_none());
    }

    #[test]
    fn embedded_states_compare_recursively() {
        let inner = MentalState::desire(Predicate::new("gold"));
        let a = MentalState::new(Modality::Belief, Payload::MentalState(Box::new(inner.clone())));
        let b = MentalState::new(Modality::Belief, Payload::MentalState(Box::new(inner)));
        assert!(a.equals(&b));
        assert!(a.embedded().is_some());
    }

    #[test]
    fn modality_copy_drops_links() {
        let mut desire = MentalState::desire(Predicate::new("water")).with_strength(0.7);
        desire.subintentions.push(MentalStateId(4));
        desire.super_intention = Some(MentalStateId(1));
        let intention = desire.as_modality(Modality::Intention);
        assert_eq!(intention.modality, Modality::Intention);
        assert!(intention.subintentions.is_empty());
        assert!(intention.super_intention.is_none());
        assert!((intention.strength - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn default_strength_is_set() {
        let state = MentalState::belief(Predicate::new("water"));
        assert!(state.has_strength());
        assert!(!state.with_strength(-1.0).has_strength());
    }
}
