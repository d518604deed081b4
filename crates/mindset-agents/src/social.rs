//! Social link engine.
//!
//! Once per tick, when the social architecture is enabled, every link an
//! agent holds is updated from its emotional history with the partner and
//! from how far its beliefs about the partner agree with its own:
//!
//! ```text
//! liking      += |L|(1-|L|)·solidarity + c·(1-|L|)·(mean_pos - mean_neg)
//! dominance    = clamp(D + c·|D|·(partner_neg - own_neg), 1, 1)
//! solidarity  += S(1-S)·(c_b·agreement - c_e·mean_neg)
//! familiarity  = clamp(F·(1 + liking), 0, 1), or 0.1 when F was 0
//! ```
//!
//! Positive emotions are joy and hope, negative ones sadness and fear, each
//! counted only when the partner caused them. Untracked intensities count as
//! zero. The dominance clamp to `[1, 1]` pins dominance at 1.0 after the
//! first update; this is kept as observed behaviour.
//!
//! Emotions about others (`happy_for`, `sorry_for`, resentment, gloating) are
//! derived here too, from the partner's snapshot.

use mindset_types::{AgentId, Emotion, EmotionKind, Modality, SocialLink};
use tracing::debug;

use crate::cognitive::CognitiveState;
use crate::snapshot::{AgentSnapshot, SnapshotMap};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Familiarity a link jumps to on its first update from zero.
const FAMILIARITY_SEED: f64 = 0.1;

/// Modalities compared when measuring belief agreement with a partner.
const AGREEMENT_MODALITIES: [Modality; 4] = [
    Modality::Belief,
    Modality::Desire,
    Modality::Uncertainty,
    Modality::Ideal,
];

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

/// Update rates for one agent's links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocialCoefficients {
    /// Rate for liking and dominance.
    pub emotional: f64,
    /// Rate for belief agreement in the solidarity update.
    pub agreement: f64,
    /// Rate for negative emotions in the solidarity update.
    pub negative_emotion: f64,
}

impl SocialCoefficients {
    /// Coefficients for `state`: personality-derived when personality is
    /// enabled, otherwise `default` for all three.
    pub fn of(state: &CognitiveState, default: f64) -> Self {
        if state.config.use_personality {
            let traits = &state.personality;
            Self {
                emotional: 1.0 - traits.neuroticism,
                agreement: 1.0 - traits.openness,
                negative_emotion: 1.0 - traits.neuroticism,
            }
        } else {
            Self {
                emotional: default,
                agreement: default,
                negative_emotion: default,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Link updates
// ---------------------------------------------------------------------------

/// Update every social link of `state`.
pub fn update_social_links(state: &mut CognitiveState, population: &SnapshotMap, default_coefficient: f64) {
    let coefficients = SocialCoefficients::of(state, default_coefficient);
    let updated: Vec<SocialLink> = state
        .social_links()
        .map(|link| updated_link(state, link, population.get(&link.agent), coefficients))
        .collect();
    for link in updated {
        if let Some(slot) = state.social_link_mut(&link.agent) {
            *slot = link;
        }
    }
}

/// One tick's update of `link`.
pub fn updated_link(
    state: &CognitiveState,
    link: &SocialLink,
    partner: Option<&AgentSnapshot>,
    coefficients: SocialCoefficients,
) -> SocialLink {
    let mut next = *link;
    next.liking = next_liking(state, link, coefficients.emotional);
    next.dominance = next_dominance(state, link, partner, coefficients.emotional);
    next.solidarity = next_solidarity(state, link, coefficients);
    next.familiarity = next_familiarity(link.familiarity, next.liking);
    next
}

fn next_liking(state: &CognitiveState, link: &SocialLink, coefficient: f64) -> f64 {
    let caused = || {
        state
            .emotions()
            .iter()
            .filter(|emotion| emotion.agent_cause == Some(link.agent))
    };
    let positive = mean_intensity(caused().filter(|emotion| emotion.kind.is_positive_valence()));
    let negative = mean_intensity(caused().filter(|emotion| emotion.kind.is_negative_valence()));
    let magnitude = link.liking.abs();
    (link.liking
        + magnitude * (1.0 - magnitude) * link.solidarity
        + coefficient * (1.0 - magnitude) * (positive - negative))
        .clamp(-1.0, 1.0)
}

fn next_dominance(
    state: &CognitiveState,
    link: &SocialLink,
    partner: Option<&AgentSnapshot>,
    coefficient: f64,
) -> f64 {
    let own = mean_intensity(
        state
            .emotions()
            .iter()
            .filter(|emotion| emotion.agent_cause == Some(link.agent))
            .filter(|emotion| emotion.kind.is_negative_valence()),
    );
    let theirs = partner.map_or(0.0, |view| {
        mean_intensity(
            view.emotions_caused_by(state.owner())
                .filter(|emotion| emotion.kind.is_negative_valence()),
        )
    });
    let drifted = link.dominance + coefficient * link.dominance.abs() * (theirs - own);
    drifted.clamp(1.0, 1.0)
}

fn next_solidarity(state: &CognitiveState, link: &SocialLink, coefficients: SocialCoefficients) -> f64 {
    let negative = mean_intensity(
        state
            .emotions()
            .iter()
            .filter(|emotion| emotion.agent_cause == Some(link.agent))
            .filter(|emotion| emotion.kind.is_negative_valence()),
    );
    let agreement = belief_agreement(state, link.agent);
    let solidarity = link.solidarity;
    (solidarity
        + solidarity
            * (1.0 - solidarity)
            * (coefficients.agreement * agreement - coefficients.negative_emotion * negative))
        .clamp(0.0, 1.0)
}

fn next_familiarity(familiarity: f64, liking: f64) -> f64 {
    if familiarity == 0.0 {
        return FAMILIARITY_SEED;
    }
    (familiarity * (1.0 + liking)).clamp(0.0, 1.0)
}

/// `(agreeing - contradicting) / compared` over the beliefs this agent holds
/// about `partner`'s own mental states, or 0 when nothing is comparable.
pub fn belief_agreement(state: &CognitiveState, partner: AgentId) -> f64 {
    let mut agreeing = 0_u32;
    let mut contradicting = 0_u32;
    for belief in state.mental_states(Modality::Belief) {
        let Some(theirs) = belief.embedded() else {
            continue;
        };
        if theirs.owner != Some(partner) || !AGREEMENT_MODALITIES.contains(&theirs.modality) {
            continue;
        }
        let Some(their_predicate) = theirs.predicate() else {
            continue;
        };
        for mine in state.mental_states(theirs.modality) {
            let Some(predicate) = mine.predicate() else {
                continue;
            };
            if predicate.equals(their_predicate) {
                agreeing = agreeing.saturating_add(1);
            }
            if predicate.equals_but_not_truth(their_predicate) {
                contradicting = contradicting.saturating_add(1);
            }
        }
    }
    let compared = agreeing.saturating_add(contradicting);
    if compared == 0 {
        return 0.0;
    }
    (f64::from(agreeing) - f64::from(contradicting)) / f64::from(compared)
}

/// Mean tracked intensity, 0 when there is nothing to average.
fn mean_intensity<'a>(emotions: impl Iterator<Item = &'a Emotion>) -> f64 {
    let (sum, count) = emotions.fold((0.0, 0_u32), |(sum, count), emotion| {
        (sum + emotion.intensity_or_zero(), count.saturating_add(1))
    });
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

// ---------------------------------------------------------------------------
// Emotions about others
// ---------------------------------------------------------------------------

/// Emotion felt about a partner's joy or sadness, by sign of liking.
pub const fn emotion_about_partner(felt: &EmotionKind, liking: f64) -> Option<EmotionKind> {
    let liked = liking > 0.0;
    match (felt, liked) {
        (EmotionKind::Joy, true) => Some(EmotionKind::HappyFor),
        (EmotionKind::Joy, false) => Some(EmotionKind::Resentment),
        (EmotionKind::Sadness, true) => Some(EmotionKind::SorryFor),
        (EmotionKind::Sadness, false) => Some(EmotionKind::Gloating),
        _ => None,
    }
}

/// For every link, react to each joy and sadness in the partner's snapshot.
///
/// The derived emotion has intensity `partner_intensity * sign(L) * L`
/// (that is `|L|` scaled), no decay, and the partner as cause.
pub fn emotions_related_to_others(state: &mut CognitiveState, population: &SnapshotMap) {
    let mut derived = Vec::new();
    for link in state.social_links() {
        let Some(partner) = population.get(&link.agent) else {
            continue;
        };
        for felt in &partner.emotions {
            let Some(kind) = emotion_about_partner(&felt.kind, link.liking) else {
                continue;
            };
            let mut emotion = Emotion::new(kind).caused_by(link.agent);
            emotion.intensity = felt.intensity.map(|i| i * link.liking.abs());
            emotion.about.clone_from(&felt.about);
            derived.push(emotion);
        }
    }
    for emotion in derived {
        debug!(agent_id = %state.owner(), emotion = %emotion, "emotion about partner");
        state.add_emotion(emotion);
    }
}

/// Drop links whose partner is no longer in the population.
pub fn drop_departed_links(state: &mut CognitiveState, population: &SnapshotMap) {
    state.retain_social_links(|agent| population.contains_key(agent));
}
