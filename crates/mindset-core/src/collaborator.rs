//! Seams to the layer that authors behaviour.
//!
//! The engine does not evaluate a modelling language. Whatever builds the
//! behaviour library hands over guards, numeric expressions and executable
//! bodies through the types here, plus a [`RandomSource`] for every draw
//! the deliberation cycle makes.
//!
//! - [`Condition`] -- boolean guards, either structural checks against the
//!   agent's stores or opaque closures.
//! - [`Expr`] -- a typed value that is either constant or computed from the
//!   agent's state (priorities, thresholds, strengths).
//! - [`RandomSource`] / [`RngSource`] -- coin flips, weighted choice and
//!   shuffles.

use std::fmt;
use std::sync::Arc;

use mindset_agents::CognitiveState;
use mindset_types::{Emotion, MentalState, Predicate};
use rand::Rng;
use rand::seq::SliceRandom;

/// A collaborator failed to produce a value.
///
/// Aborts the current agent's tick. Store mutations already made stay.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    /// An expression could not be evaluated.
    #[error("guard `{guard}` failed: {reason}")]
    Failed {
        /// Name of the failing guard or expression.
        guard: String,
        /// What went wrong.
        reason: String,
    },

    /// A numeric expression produced NaN or an infinity.
    #[error("`{what}` evaluated to a non-finite number: {value}")]
    NonFinite {
        /// Which value was being computed.
        what: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl GuardError {
    /// Shorthand for [`GuardError::Failed`].
    pub fn failed(guard: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            guard: guard.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Something that computes a `T` from an agent's state.
///
/// Implemented for every `Fn(&CognitiveState) -> Result<T, GuardError>`.
pub trait Evaluate<T>: Send + Sync {
    /// Compute the value for `state`.
    fn evaluate(&self, state: &CognitiveState) -> Result<T, GuardError>;
}

impl<T, F> Evaluate<T> for F
where
    F: Fn(&CognitiveState) -> Result<T, GuardError> + Send + Sync,
{
    fn evaluate(&self, state: &CognitiveState) -> Result<T, GuardError> {
        self(state)
    }
}

impl<T> fmt::Debug for dyn Evaluate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<expression>")
    }
}

/// A typed value supplied by the behaviour layer.
#[derive(Debug, Clone)]
pub enum Expr<T> {
    /// A literal.
    Const(T),
    /// Computed from the agent's state on every read.
    Eval(Arc<dyn Evaluate<T>>),
}

impl<T: Clone> Expr<T> {
    /// Wrap a closure.
    pub fn eval(f: impl Fn(&CognitiveState) -> Result<T, GuardError> + Send + Sync + 'static) -> Self
    where
        T: 'static,
    {
        Self::Eval(Arc::new(f))
    }

    /// Read the value for `state`.
    pub fn value(&self, state: &CognitiveState) -> Result<T, GuardError> {
        match self {
            Self::Const(value) => Ok(value.clone()),
            Self::Eval(expr) => expr.evaluate(state),
        }
    }
}

impl Expr<f64> {
    /// Read a number, rejecting NaN and infinities.
    pub fn number(&self, state: &CognitiveState, what: &'static str) -> Result<f64, GuardError> {
        let value = self.value(state)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(GuardError::NonFinite { what, value })
        }
    }
}

impl From<f64> for Expr<f64> {
    fn from(value: f64) -> Self {
        Self::Const(value)
    }
}

/// A boolean guard.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Always true.
    Always,
    /// Always false.
    Never,
    /// The agent holds this belief.
    HasBelief(Predicate),
    /// The agent holds this desire.
    HasDesire(Predicate),
    /// The agent holds this uncertainty.
    HasUncertainty(Predicate),
    /// The agent holds this obligation.
    HasObligation(Predicate),
    /// The agent's emotion base contains this emotion.
    HasEmotion(Emotion),
    /// Negation.
    Not(Box<Condition>),
    /// Every condition holds. True when empty.
    All(Vec<Condition>),
    /// At least one condition holds. False when empty.
    Any(Vec<Condition>),
    /// Computed by the behaviour layer.
    Custom(Arc<dyn Evaluate<bool>>),
}

impl Condition {
    /// Wrap a closure.
    pub fn custom(
        f: impl Fn(&CognitiveState) -> Result<bool, GuardError> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against `state`.
    pub fn holds(&self, state: &CognitiveState) -> Result<bool, GuardError> {
        match self {
            Self::Always => Ok(true),
            Self::Never => Ok(false),
            Self::HasBelief(p) => Ok(state.has_belief(&MentalState::belief(p.clone()))),
            Self::HasDesire(p) => Ok(state.has_desire(&MentalState::desire(p.clone()))),
            Self::HasUncertainty(p) => {
                Ok(state.has_uncertainty(&MentalState::uncertainty(p.clone())))
            }
            Self::HasObligation(p) => {
                Ok(state.has_obligation(&MentalState::obligation(p.clone())))
            }
            Self::HasEmotion(emotion) => Ok(state.has_emotion(emotion)),
            Self::Not(inner) => Ok(!inner.holds(state)?),
            Self::All(all) => {
                for condition in all {
                    if !condition.holds(state)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any(any) => {
                for condition in any {
                    if condition.holds(state)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Custom(f) => f.evaluate(state),
        }
    }
}

/// Evaluate an optional guard, where absence means "satisfied".
pub fn holds_or_absent(
    condition: Option<&Condition>,
    state: &CognitiveState,
) -> Result<bool, GuardError> {
    condition.map_or(Ok(true), |c| c.holds(state))
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Every random draw the cycle makes.
pub trait RandomSource {
    /// True with probability `probability`, clamped to `[0, 1]`.
    fn flip(&mut self, probability: f64) -> bool;

    /// Index drawn with probability proportional to its weight.
    ///
    /// Non-positive and non-finite weights never win unless every weight
    /// is such, in which case the draw is uniform. `None` only for an
    /// empty slice.
    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize>;

    /// Shuffle `items` in place.
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// [`RandomSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap `rng`.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Take the generator back.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn flip(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.random_bool(probability)
    }

    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let usable = |w: f64| w.is_finite() && w > 0.0;
        let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
        if total <= 0.0 || !total.is_finite() {
            return Some(self.rng.random_range(0..weights.len()));
        }
        let mut target = self.rng.random::<f64>() * total;
        let mut last_usable = None;
        for (index, weight) in weights.iter().copied().enumerate() {
            if !usable(weight) {
                continue;
            }
            if target < weight {
                return Some(index);
            }
            target -= weight;
            last_usable = Some(index);
        }
        last_usable
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_agents::{CognitionTunables, EngineConfig};
    use mindset_types::{AgentId, EmotionKind};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn state() -> CognitiveState {
        CognitiveState::new(
            AgentId::new(),
            EngineConfig::default(),
            &CognitionTunables::default(),
        )
    }

    #[test]
    fn structural_conditions_read_the_stores() {
        let mut s = state();
        s.add_belief(MentalState::belief(Predicate::new("raining")));
        s.add_emotion(Emotion::new(EmotionKind::Fear));

        assert!(Condition::HasBelief(Predicate::new("raining")).holds(&s).unwrap());
        assert!(!Condition::HasDesire(Predicate::new("raining")).holds(&s).unwrap());
        assert!(Condition::HasEmotion(Emotion::new(EmotionKind::Fear)).holds(&s).unwrap());
        let both = Condition::All(vec![
            Condition::HasBelief(Predicate::new("raining")),
            Condition::HasEmotion(Emotion::new(EmotionKind::Joy)).negate(),
        ]);
        assert!(both.holds(&s).unwrap());
        assert!(!Condition::Any(Vec::new()).holds(&s).unwrap());
        assert!(Condition::All(Vec::new()).holds(&s).unwrap());
    }

    #[test]
    fn custom_condition_errors_propagate() {
        let failing = Condition::custom(|_| Err(GuardError::failed("broken", "no value")));
        let err = Condition::All(vec![Condition::Always, failing]).holds(&state());
        assert!(matches!(err, Err(GuardError::Failed { .. })));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let s = state();
        assert!((Expr::Const(0.5).number(&s, "priority").unwrap() - 0.5).abs() < f64::EPSILON);
        let nan = Expr::eval(|_| Ok(f64::NAN));
        assert!(matches!(
            nan.number(&s, "priority"),
            Err(GuardError::NonFinite { what: "priority", .. })
        ));
    }

    #[test]
    fn flip_edges_are_deterministic() {
        let mut rng = RngSource::new(SmallRng::seed_from_u64(42));
        assert!(rng.flip(1.0));
        assert!(rng.flip(3.0));
        assert!(!rng.flip(0.0));
        assert!(!rng.flip(f64::NAN));
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = RngSource::new(SmallRng::seed_from_u64(42));
        for _ in 0..50 {
            assert_eq!(rng.choose_weighted(&[0.0, 2.0, -1.0]), Some(1));
        }
        assert_eq!(rng.choose_weighted(&[]), None);
        let uniform = rng.choose_weighted(&[0.0, 0.0]).unwrap();
        assert!(uniform < 2);
    }
}
