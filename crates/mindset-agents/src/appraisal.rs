//! Emotion appraisal as a declarative rule table.
//!
//! Each [`Rule`] pairs a trigger [`Pattern`] with the emotions it derives and
//! the [`IntensityFormula`] used to size them. [`RULES`] lists every rule in
//! evaluation order; the interpreter below walks the table once per incoming
//! belief or uncertainty. Joy and sadness derived from desires cascade into
//! the [`Stage::Cascade`] rules (gratification, gratitude, remorse, anger)
//! right after they are stored.
//!
//! Rule families:
//!
//! | Stage | Pattern | Derived |
//! |---|---|---|
//! | belief | equal desire | joy |
//! | belief | contradicted desire | sadness |
//! | belief | hope confirmed / contradicted | satisfaction + joy / disappointment + sadness |
//! | belief | fear confirmed / contradicted | `fear_confirmed` + sadness / relief + joy |
//! | belief | ideal upheld / breached | pride, admiration / shame, reproach |
//! | belief | partner's joy / sadness | `happy_for`, resentment / `sorry_for`, gloating |
//! | uncertainty | equal / contradicted desire | hope / fear |
//! | cascade | prior pride, admiration after joy | gratification, gratitude |
//! | cascade | prior shame, reproach after sadness | remorse, anger |
//!
//! Decay rates are expressed per hour of simulated time: a decay of
//! `neuroticism * intensity` per hour becomes `time_step / 3600` of that per
//! tick.

use mindset_types::{AgentId, Emotion, EmotionKind, MentalState, Modality, Personality, Predicate};
use tracing::debug;

use crate::cognitive::CognitiveState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Seconds per hour, the unit decay rates are expressed in.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Personality pivot: traits above it damp the derived intensity.
const TRAIT_PIVOT: f64 = 0.5;

// ---------------------------------------------------------------------------
// Rule table types
// ---------------------------------------------------------------------------

/// When a rule is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A belief is being added.
    Belief,
    /// An uncertainty is being added.
    Uncertainty,
    /// An emotion of this kind was just derived by a cascading rule.
    Cascade(EmotionKind),
}

/// Which agent an ideal-based appraisal blames or credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blame {
    /// The incoming predicate was caused by this agent.
    SelfCaused,
    /// The incoming predicate has any cause; the emotion is towards it.
    Caused,
}

/// What a rule matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A desire equal to the incoming record is held. The last such desire
    /// supplies the second strength.
    DesireHeld,
    /// A desire contradicts the incoming predicate and none is equal to it.
    /// Fires once per contradicting desire.
    DesireContradicted,
    /// A held emotion of this kind is about the incoming predicate.
    EmotionConfirmed(EmotionKind),
    /// A held emotion of this kind is about the opposite of the incoming
    /// predicate.
    EmotionContradicted(EmotionKind),
    /// An ideal about the incoming predicate with strength above zero
    /// (`praised`) or below one (not `praised`).
    Ideal {
        /// Strength test to apply.
        praised: bool,
        /// Cause requirement and emotion target.
        blame: Blame,
    },
    /// The incoming belief embeds an emotion of this kind felt by a link
    /// partner.
    PartnerFeels(EmotionKind),
    /// A held emotion of this kind is about the trigger's predicate, which
    /// this agent caused.
    PriorSelfAppraisal(EmotionKind),
    /// A held emotion of this kind is about the trigger's predicate and
    /// shares its cause.
    PriorOtherAppraisal(EmotionKind),
}

/// What a rule derives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derive {
    /// This emotion.
    One(EmotionKind),
    /// These two emotions, in this order.
    Both(EmotionKind, EmotionKind),
    /// One emotion chosen by the sign of the partner's liking.
    ByLiking {
        /// Derived when liking is positive.
        liked: EmotionKind,
        /// Derived otherwise.
        disliked: EmotionKind,
    },
}

/// How the derived intensity and decay are computed.
///
/// Without personality every formula except [`Self::Inherit`] yields an
/// intensity of 1 and a decay of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityFormula {
    /// `clamp(record_strength * desire_strength * (1 + 0.5 - N))` when both
    /// strengths are set; decay `ts / 3600 * N * intensity`.
    StrengthProduct,
    /// The source emotion's intensity; decay `ts / 3600 * N * intensity`.
    Inherit,
    /// `clamp(record_strength * |ideal_strength| * (1 + 0.5 - O))`; decay
    /// `-(ts / 3600 * N)`.
    IdealWeighted,
    /// Product of the trigger and prior intensities when both are tracked,
    /// else 1; decay `ts / 3600 * N * intensity`.
    IntensityProduct,
    /// `clamp(intensity * |liking| * (1 - sign(liking) * (0.5 - A)))`; decay
    /// `-(ts / 3600 * N)`.
    LikingWeighted,
}

/// One appraisal rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Short identifier used in logs and tests.
    pub name: &'static str,
    /// When the rule is evaluated.
    pub stage: Stage,
    /// What it matches.
    pub pattern: Pattern,
    /// What it derives.
    pub derive: Derive,
    /// How the derived emotions are sized.
    pub intensity: IntensityFormula,
    /// Remove the matched source emotion after deriving.
    pub consumes_source: bool,
    /// Run the cascade stage for each derived emotion.
    pub cascades: bool,
}

/// The appraisal rules in evaluation order.
pub static RULES: [Rule; 18] = [
    Rule {
        name: "joy",
        stage: Stage::Belief,
        pattern: Pattern::DesireHeld,
        derive: Derive::One(EmotionKind::Joy),
        intensity: IntensityFormula::StrengthProduct,
        consumes_source: false,
        cascades: true,
    },
    Rule {
        name: "sadness",
        stage: Stage::Belief,
        pattern: Pattern::DesireContradicted,
        derive: Derive::One(EmotionKind::Sadness),
        intensity: IntensityFormula::StrengthProduct,
        consumes_source: false,
        cascades: true,
    },
    Rule {
        name: "satisfaction",
        stage: Stage::Belief,
        pattern: Pattern::EmotionConfirmed(EmotionKind::Hope),
        derive: Derive::Both(EmotionKind::Satisfaction, EmotionKind::Joy),
        intensity: IntensityFormula::Inherit,
        consumes_source: true,
        cascades: false,
    },
    Rule {
        name: "disappointment",
        stage: Stage::Belief,
        pattern: Pattern::EmotionContradicted(EmotionKind::Hope),
        derive: Derive::Both(EmotionKind::Disappointment, EmotionKind::Sadness),
        intensity: IntensityFormula::Inherit,
        consumes_source: true,
        cascades: false,
    },
    Rule {
        name: "fear_confirmed",
        stage: Stage::Belief,
        pattern: Pattern::EmotionConfirmed(EmotionKind::Fear),
        derive: Derive::Both(EmotionKind::FearConfirmed, EmotionKind::Sadness),
        intensity: IntensityFormula::Inherit,
        consumes_source: true,
        cascades: false,
    },
    Rule {
        name: "relief",
        stage: Stage::Belief,
        pattern: Pattern::EmotionContradicted(EmotionKind::Fear),
        derive: Derive::Both(EmotionKind::Relief, EmotionKind::Joy),
        intensity: IntensityFormula::Inherit,
        consumes_source: true,
        cascades: false,
    },
    Rule {
        name: "pride",
        stage: Stage::Belief,
        pattern: Pattern::Ideal {
            praised: true,
            blame: Blame::SelfCaused,
        },
        derive: Derive::One(EmotionKind::Pride),
        intensity: IntensityFormula::IdealWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "admiration",
        stage: Stage::Belief,
        pattern: Pattern::Ideal {
            praised: true,
            blame: Blame::Caused,
        },
        derive: Derive::One(EmotionKind::Admiration),
        intensity: IntensityFormula::IdealWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "shame",
        stage: Stage::Belief,
        pattern: Pattern::Ideal {
            praised: false,
            blame: Blame::SelfCaused,
        },
        derive: Derive::One(EmotionKind::Shame),
        intensity: IntensityFormula::IdealWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "reproach",
        stage: Stage::Belief,
        pattern: Pattern::Ideal {
            praised: false,
            blame: Blame::Caused,
        },
        derive: Derive::One(EmotionKind::Reproach),
        intensity: IntensityFormula::IdealWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "happy_for",
        stage: Stage::Belief,
        pattern: Pattern::PartnerFeels(EmotionKind::Joy),
        derive: Derive::ByLiking {
            liked: EmotionKind::HappyFor,
            disliked: EmotionKind::Resentment,
        },
        intensity: IntensityFormula::LikingWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "sorry_for",
        stage: Stage::Belief,
        pattern: Pattern::PartnerFeels(EmotionKind::Sadness),
        derive: Derive::ByLiking {
            liked: EmotionKind::SorryFor,
            disliked: EmotionKind::Gloating,
        },
        intensity: IntensityFormula::LikingWeighted,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "hope",
        stage: Stage::Uncertainty,
        pattern: Pattern::DesireHeld,
        derive: Derive::One(EmotionKind::Hope),
        intensity: IntensityFormula::StrengthProduct,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "fear",
        stage: Stage::Uncertainty,
        pattern: Pattern::DesireContradicted,
        derive: Derive::One(EmotionKind::Fear),
        intensity: IntensityFormula::StrengthProduct,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "gratification",
        stage: Stage::Cascade(EmotionKind::Joy),
        pattern: Pattern::PriorSelfAppraisal(EmotionKind::Pride),
        derive: Derive::One(EmotionKind::Gratification),
        intensity: IntensityFormula::IntensityProduct,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "gratitude",
        stage: Stage::Cascade(EmotionKind::Joy),
        pattern: Pattern::PriorOtherAppraisal(EmotionKind::Admiration),
        derive: Derive::One(EmotionKind::Gratitude),
        intensity: IntensityFormula::IntensityProduct,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "remorse",
        stage: Stage::Cascade(EmotionKind::Sadness),
        pattern: Pattern::PriorSelfAppraisal(EmotionKind::Shame),
        derive: Derive::One(EmotionKind::Remorse),
        intensity: IntensityFormula::IntensityProduct,
        consumes_source: false,
        cascades: false,
    },
    Rule {
        name: "anger",
        stage: Stage::Cascade(EmotionKind::Sadness),
        pattern: Pattern::PriorOtherAppraisal(EmotionKind::Reproach),
        derive: Derive::One(EmotionKind::Anger),
        intensity: IntensityFormula::IntensityProduct,
        consumes_source: false,
        cascades: false,
    },
];

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run the belief rules for `belief`, which is about to be stored.
pub fn appraise_belief(state: &mut CognitiveState, belief: &MentalState) {
    run_stage(state, &Stage::Belief, &Trigger::Record(belief));
}

/// Run the uncertainty rules for `uncertainty`, which is about to be stored.
pub fn appraise_uncertainty(state: &mut CognitiveState, uncertainty: &MentalState) {
    run_stage(state, &Stage::Uncertainty, &Trigger::Record(uncertainty));
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// What set a stage off.
enum Trigger<'a> {
    Record(&'a MentalState),
    Derived(&'a Emotion),
}

/// One match of a rule, with the inputs its formula needs.
#[derive(Debug, Clone)]
struct Hit {
    about: Option<Predicate>,
    cause: Option<AgentId>,
    primary: Option<f64>,
    secondary: Option<f64>,
    source: Option<Emotion>,
}

/// Inputs shared by every formula evaluation.
#[derive(Debug, Clone, Copy)]
struct Temperament {
    enabled: bool,
    personality: Personality,
    hours_per_tick: f64,
}

impl Temperament {
    fn of(state: &CognitiveState) -> Self {
        Self {
            enabled: state.config.use_personality,
            personality: state.personality,
            hours_per_tick: state.time_step / SECONDS_PER_HOUR,
        }
    }

    /// Decay for an emotion of the given intensity.
    fn decay(&self, intensity: f64) -> f64 {
        self.hours_per_tick * self.personality.neuroticism * intensity
    }

    /// Decay applied by the formulas whose rate does not scale with
    /// intensity. Negative: such emotions grow until they saturate.
    fn flat_decay(&self) -> f64 {
        -(self.hours_per_tick * self.personality.neuroticism)
    }
}

impl IntensityFormula {
    /// Intensity and decay of the emotion derived from `hit`.
    fn evaluate(self, hit: &Hit, temperament: &Temperament) -> (Option<f64>, f64) {
        if self == Self::Inherit {
            let decay = if temperament.enabled {
                hit.primary.map_or(0.0, |i| temperament.decay(i))
            } else {
                0.0
            };
            return (hit.primary, decay);
        }
        if !temperament.enabled {
            return (Some(1.0), 0.0);
        }
        let traits = &temperament.personality;
        match self {
            Self::StrengthProduct => {
                let intensity = match (hit.primary, hit.secondary) {
                    (Some(a), Some(b)) if a >= 0.0 && b >= 0.0 => {
                        clamp_unit(a * b * (1.0 + (TRAIT_PIVOT - traits.neuroticism)))
                    }
                    _ => 1.0,
                };
                (Some(intensity), temperament.decay(intensity))
            }
            Self::IdealWeighted => {
                let strength = hit.primary.unwrap_or(0.0);
                let ideal = hit.secondary.unwrap_or(0.0).abs();
                let intensity =
                    clamp_unit(strength * ideal * (1.0 + (TRAIT_PIVOT - traits.openness)));
                (Some(intensity), temperament.flat_decay())
            }
            Self::IntensityProduct => {
                let intensity = match (hit.primary, hit.secondary) {
                    (Some(a), Some(b)) => a * b,
                    _ => 1.0,
                };
                (Some(intensity), temperament.decay(intensity))
            }
            Self::LikingWeighted => {
                let felt = hit.primary.unwrap_or(0.0);
                let liking = hit.secondary.unwrap_or(0.0);
                let intensity = clamp_unit(
                    felt * liking.abs() * (1.0 - sign(liking) * (TRAIT_PIVOT - traits.agreeableness)),
                );
                (Some(intensity), temperament.flat_decay())
            }
            Self::Inherit => (hit.primary, 0.0),
        }
    }
}

impl Derive {
    fn kinds(&self, hit: &Hit) -> Vec<EmotionKind> {
        match self {
            Self::One(kind) => vec![kind.clone()],
            Self::Both(first, second) => vec![first.clone(), second.clone()],
            Self::ByLiking { liked, disliked } => {
                if hit.secondary.is_some_and(|liking| liking > 0.0) {
                    vec![liked.clone()]
                } else {
                    vec![disliked.clone()]
                }
            }
        }
    }
}

fn run_stage(state: &mut CognitiveState, stage: &Stage, trigger: &Trigger<'_>) {
    for rule in RULES.iter().filter(|rule| rule.stage == *stage) {
        let hits = match_rule(state, &rule.pattern, trigger);
        for hit in hits {
            fire(state, rule, &hit);
        }
    }
}

fn fire(state: &mut CognitiveState, rule: &Rule, hit: &Hit) {
    let temperament = Temperament::of(state);
    let (intensity, decay) = rule.intensity.evaluate(hit, &temperament);
    for kind in rule.derive.kinds(hit) {
        let emotion = Emotion {
            kind,
            intensity,
            decay,
            about: hit.about.clone(),
            agent_cause: hit.cause,
            owner: None,
        };
        debug!(agent_id = %state.owner(), rule = rule.name, emotion = %emotion, "appraisal fired");
        state.add_emotion(emotion.clone());
        if rule.cascades {
            run_stage(state, &Stage::Cascade(emotion.kind.clone()), &Trigger::Derived(&emotion));
        }
    }
    if rule.consumes_source {
        if let Some(source) = &hit.source {
            state.remove_emotion(source);
        }
    }
}

fn match_rule(state: &CognitiveState, pattern: &Pattern, trigger: &Trigger<'_>) -> Vec<Hit> {
    match trigger {
        Trigger::Record(record) => match_record(state, pattern, record),
        Trigger::Derived(emotion) => match_derived(state, pattern, emotion),
    }
}

fn match_record(state: &CognitiveState, pattern: &Pattern, record: &MentalState) -> Vec<Hit> {
    if let Pattern::PartnerFeels(kind) = pattern {
        return match_partner(state, kind, record);
    }
    let Some(predicate) = record.predicate() else {
        return Vec::new();
    };
    let desire_held = state.store().contains(Modality::Desire, record);
    match pattern {
        Pattern::DesireHeld => {
            if !desire_held {
                return Vec::new();
            }
            let desire_strength = state
                .mental_states(Modality::Desire)
                .filter(|desire| desire.is_about(predicate))
                .last()
                .map(|desire| desire.strength);
            vec![Hit {
                about: Some(predicate.clone()),
                cause: predicate.agent_cause,
                primary: Some(record.strength),
                secondary: desire_strength,
                source: None,
            }]
        }
        Pattern::DesireContradicted => {
            if desire_held {
                return Vec::new();
            }
            state
                .mental_states(Modality::Desire)
                .filter(|desire| {
                    desire
                        .predicate()
                        .is_some_and(|other| predicate.equals_but_not_truth(other))
                })
                .map(|desire| Hit {
                    about: Some(predicate.clone()),
                    cause: predicate.agent_cause,
                    primary: Some(record.strength),
                    secondary: Some(desire.strength),
                    source: None,
                })
                .collect()
        }
        Pattern::EmotionConfirmed(kind) | Pattern::EmotionContradicted(kind) => {
            let confirmed = matches!(pattern, Pattern::EmotionConfirmed(_));
            state
                .emotions()
                .of_kind(kind)
                .filter(|held| {
                    held.about.as_ref().is_some_and(|about| {
                        if confirmed {
                            about.equals_emotions(predicate)
                        } else {
                            about.equals_but_not_truth(predicate)
                        }
                    })
                })
                .map(|held| Hit {
                    about: held.about.clone(),
                    cause: held.agent_cause,
                    primary: held.intensity,
                    secondary: None,
                    source: Some(held.clone()),
                })
                .collect()
        }
        Pattern::Ideal { praised, blame } => {
            let Some(cause) = predicate.agent_cause else {
                return Vec::new();
            };
            let target = match blame {
                Blame::SelfCaused if cause == state.owner() => cause,
                Blame::SelfCaused => return Vec::new(),
                Blame::Caused => cause,
            };
            state
                .mental_states(Modality::Ideal)
                .filter(|ideal| ideal.is_about(predicate))
                .filter(|ideal| {
                    if *praised {
                        ideal.strength > 0.0
                    } else {
                        ideal.strength < 1.0
                    }
                })
                .map(|ideal| Hit {
                    about: Some(predicate.clone()),
                    cause: Some(target),
                    primary: Some(record.strength),
                    secondary: Some(ideal.strength),
                    source: None,
                })
                .collect()
        }
        Pattern::PartnerFeels(_)
        | Pattern::PriorSelfAppraisal(_)
        | Pattern::PriorOtherAppraisal(_) => Vec::new(),
    }
}

fn match_partner(state: &CognitiveState, kind: &EmotionKind, record: &MentalState) -> Vec<Hit> {
    let Some(felt) = record.emotion() else {
        return Vec::new();
    };
    if felt.kind != *kind {
        return Vec::new();
    }
    let Some(partner) = felt.owner else {
        return Vec::new();
    };
    state
        .social_link(&partner)
        .map(|link| Hit {
            about: felt.about.clone(),
            cause: Some(partner),
            primary: felt.intensity,
            secondary: Some(link.liking),
            source: None,
        })
        .into_iter()
        .collect()
}

fn match_derived(state: &CognitiveState, pattern: &Pattern, trigger: &Emotion) -> Vec<Hit> {
    let Some(about) = trigger.about.as_ref() else {
        return Vec::new();
    };
    let Some(about_cause) = about.agent_cause else {
        return Vec::new();
    };
    let (kind, self_appraisal) = match pattern {
        Pattern::PriorSelfAppraisal(kind) => (kind, true),
        Pattern::PriorOtherAppraisal(kind) => (kind, false),
        _ => return Vec::new(),
    };
    if self_appraisal && about_cause != state.owner() {
        return Vec::new();
    }
    state
        .emotions()
        .of_kind(kind)
        .filter(|prior| {
            prior.about.as_ref().is_some_and(|prior_about| {
                prior_about.equals(about)
                    && (self_appraisal || prior_about.agent_cause == Some(about_cause))
            })
        })
        .map(|prior| Hit {
            about: prior.about.clone(),
            cause: trigger.agent_cause,
            primary: trigger.intensity,
            secondary: prior.intensity,
            source: None,
        })
        .collect()
}

/// Clamp to `[0, 1]`.
fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Sign with `sign(0) == 0`.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_types::{Payload, SocialLink};

    use super::*;
    use crate::config::{CognitionTunables, EngineConfig};

    fn emotional(use_personality: bool) -> CognitiveState {
        let config = EngineConfig {
            use_emotion_architecture: true,
            use_personality,
            ..EngineConfig::default()
        };
        CognitiveState::new(AgentId::new(), config, &CognitionTunables::default())
    }

    fn water() -> Predicate {
        Predicate::new("water")
    }

    fn held(state: &CognitiveState, kind: EmotionKind) -> Option<Emotion> {
        state.emotions().first_of_kind(&kind).cloned()
    }

    #[test]
    fn every_rule_has_a_unique_name() {
        let mut names: Vec<&str> = RULES.iter().map(|rule| rule.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn joy_without_personality_is_full_and_static() {
        let mut s = emotional(false);
        s.add_desire(None, MentalState::desire(water()));
        s.add_belief(MentalState::belief(water()));
        let joys: Vec<&Emotion> = s.emotions().of_kind(&EmotionKind::Joy).collect();
        assert_eq!(joys.len(), 1);
        let joy = joys.first().unwrap();
        assert!((joy.intensity.unwrap() - 1.0).abs() < 1e-9);
        assert!(joy.decay.abs() < 1e-9);
        assert!(joy.is_about(&water()));
    }

    #[test]
    fn joy_with_personality_scales_by_neuroticism() {
        let mut s = emotional(true);
        s.personality.neuroticism = 0.8;
        s.time_step = 3600.0;
        s.add_desire(None, MentalState::desire(water()).with_strength(0.5));
        s.add_belief(MentalState::belief(water()));
        let joy = held(&s, EmotionKind::Joy).unwrap();
        // 1.0 * 0.5 * (1 + (0.5 - 0.8)) = 0.35
        assert!((joy.intensity.unwrap() - 0.35).abs() < 1e-9);
        assert!((joy.decay - 0.8 * 0.35).abs() < 1e-9);
    }

    #[test]
    fn sadness_fires_on_contradicted_desire() {
        let mut s = emotional(false);
        s.add_desire(None, MentalState::desire(water()));
        s.add_belief(MentalState::belief(water().with_truth(false)));
        assert!(held(&s, EmotionKind::Sadness).is_some());
        assert!(held(&s, EmotionKind::Joy).is_none());
    }

    #[test]
    fn hope_and_fear_come_from_uncertainty() {
        let mut s = emotional(false);
        s.add_desire(None, MentalState::desire(water()));
        s.add_desire(None, MentalState::desire(Predicate::new("safe")));
        s.add_uncertainty(MentalState::uncertainty(water()));
        s.add_uncertainty(MentalState::uncertainty(Predicate::new("safe").with_truth(false)));
        assert!(held(&s, EmotionKind::Hope).unwrap().is_about(&water()));
        let fear = held(&s, EmotionKind::Fear).unwrap();
        assert!(fear.is_about(&Predicate::new("safe").with_truth(false)));
    }

    #[test]
    fn confirmed_hope_becomes_satisfaction_and_joy() {
        let mut s = emotional(false);
        s.add_emotion(Emotion::new(EmotionKind::Hope).with_intensity(0.4).about(water()));
        s.add_belief(MentalState::belief(water()));
        assert!(held(&s, EmotionKind::Hope).is_none());
        let satisfaction = held(&s, EmotionKind::Satisfaction).unwrap();
        assert!((satisfaction.intensity.unwrap() - 0.4).abs() < 1e-9);
        assert!(held(&s, EmotionKind::Joy).is_some());
    }

    #[test]
    fn contradicted_fear_becomes_relief_and_joy() {
        let mut s = emotional(false);
        s.add_emotion(Emotion::new(EmotionKind::Fear).about(water()));
        s.add_belief(MentalState::belief(water().with_truth(false)));
        assert!(held(&s, EmotionKind::Fear).is_none());
        let relief = held(&s, EmotionKind::Relief).unwrap();
        assert!(relief.intensity.is_none());
        assert!(held(&s, EmotionKind::Joy).is_some());
    }

    #[test]
    fn contradicted_hope_and_confirmed_fear() {
        let mut s = emotional(false);
        s.add_emotion(Emotion::new(EmotionKind::Hope).with_intensity(0.6).about(water()));
        s.add_emotion(Emotion::new(EmotionKind::Fear).with_intensity(0.3).about(Predicate::new("storm")));
        s.add_belief(MentalState::belief(water().with_truth(false)));
        s.add_belief(MentalState::belief(Predicate::new("storm")));
        assert!(held(&s, EmotionKind::Disappointment).is_some());
        assert!(held(&s, EmotionKind::FearConfirmed).is_some());
        assert_eq!(s.emotions().of_kind(&EmotionKind::Sadness).count(), 2);
    }

    #[test]
    fn self_caused_ideal_gives_pride_and_admiration() {
        let mut s = emotional(false);
        let me = s.owner();
        s.add_ideal(MentalState::ideal(Predicate::new("help")).with_strength(0.5));
        s.add_belief(MentalState::belief(Predicate::new("help").with_cause(me)));
        // Strength 0.5 is both above 0 and below 1.
        for kind in [
            EmotionKind::Pride,
            EmotionKind::Admiration,
            EmotionKind::Shame,
            EmotionKind::Reproach,
        ] {
            let emotion = held(&s, kind).unwrap();
            assert_eq!(emotion.agent_cause, Some(me));
        }
    }

    #[test]
    fn other_caused_ideal_gives_admiration_only() {
        let mut s = emotional(true);
        s.time_step = 3600.0;
        s.personality.neuroticism = 0.5;
        let other = AgentId::new();
        s.add_ideal(MentalState::ideal(Predicate::new("help")).with_strength(1.0));
        s.add_belief(MentalState::belief(Predicate::new("help").with_cause(other)));
        assert!(held(&s, EmotionKind::Pride).is_none());
        assert!(held(&s, EmotionKind::Reproach).is_none());
        let admiration = held(&s, EmotionKind::Admiration).unwrap();
        assert_eq!(admiration.agent_cause, Some(other));
        assert!((admiration.intensity.unwrap() - 1.0).abs() < 1e-9);
        assert!((admiration.decay + 0.5).abs() < 1e-9);
    }

    #[test]
    fn joy_after_pride_cascades_into_gratification() {
        let mut s = emotional(false);
        let me = s.owner();
        let achieved = Predicate::new("help").with_cause(me);
        s.add_emotion(Emotion::new(EmotionKind::Pride).about(achieved.clone()).caused_by(me));
        s.add_desire(None, MentalState::desire(achieved.clone()));
        s.add_belief(MentalState::belief(achieved));
        let gratification = held(&s, EmotionKind::Gratification).unwrap();
        assert_eq!(gratification.agent_cause, Some(me));
    }

    #[test]
    fn sadness_after_reproach_cascades_into_anger() {
        let mut s = emotional(false);
        let culprit = AgentId::new();
        let harm = Predicate::new("harm").with_cause(culprit);
        s.add_emotion(Emotion::new(EmotionKind::Reproach).about(harm.clone().with_truth(false)));
        s.add_desire(None, MentalState::desire(harm.clone()));
        s.add_belief(MentalState::belief(harm.with_truth(false)));
        let anger = held(&s, EmotionKind::Anger).unwrap();
        assert_eq!(anger.agent_cause, Some(culprit));
        assert!(held(&s, EmotionKind::Remorse).is_none());
    }

    #[test]
    fn liked_partner_joy_gives_happy_for() {
        let mut s = emotional(false);
        let partner = AgentId::new();
        s.add_social_link(SocialLink::new(partner).with_liking(0.5));
        let mut joy = Emotion::new(EmotionKind::Joy).with_intensity(0.8).about(water());
        joy.owner = Some(partner);
        s.add_belief(MentalState::new(Modality::Belief, Payload::Emotion(joy)));
        let happy = held(&s, EmotionKind::HappyFor).unwrap();
        assert_eq!(happy.agent_cause, Some(partner));
        assert!(happy.is_about(&water()));
    }

    #[test]
    fn disliked_partner_sadness_gives_gloating_with_personality() {
        let mut s = emotional(true);
        s.personality.agreeableness = 0.5;
        let partner = AgentId::new();
        s.add_social_link(SocialLink::new(partner).with_liking(-0.5));
        let mut sadness = Emotion::new(EmotionKind::Sadness).with_intensity(0.8);
        sadness.owner = Some(partner);
        s.add_belief(MentalState::new(Modality::Belief, Payload::Emotion(sadness)));
        let gloating = held(&s, EmotionKind::Gloating).unwrap();
        // 0.8 * 0.5 * (1 - (-1) * 0) = 0.4
        assert!((gloating.intensity.unwrap() - 0.4).abs() < 1e-9);
        assert!(held(&s, EmotionKind::SorryFor).is_none());
    }

    #[test]
    fn unknown_partner_is_ignored() {
        let mut s = emotional(false);
        let mut joy = Emotion::new(EmotionKind::Joy);
        joy.owner = Some(AgentId::new());
        s.add_belief(MentalState::new(Modality::Belief, Payload::Emotion(joy)));
        assert!(s.emotions().is_empty());
    }

    #[test]
    fn appraisal_is_skipped_when_disabled() {
        let mut s = CognitiveState::new(
            AgentId::new(),
            EngineConfig::default(),
            &CognitionTunables::default(),
        );
        s.add_desire(None, MentalState::desire(water()));
        s.add_belief(MentalState::belief(water()));
        assert!(s.emotions().is_empty());
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert!(sign(0.0).abs() < f64::EPSILON);
        assert!((sign(-0.2) + 1.0).abs() < f64::EPSILON);
    }
}
