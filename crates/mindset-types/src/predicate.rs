//! Predicates: named, valued, truth-qualified propositions.
//!
//! A [`Predicate`] is the usual payload of a mental state. Several equality
//! flavours coexist and none of them is transitive, so [`Predicate`]
//! deliberately does not implement [`PartialEq`]. Callers pick the flavour
//! that matches their intent:
//!
//! - [`Predicate::equals`] -- store membership and belief lookup.
//! - [`Predicate::equals_but_not_truth`] -- detecting a contradiction.
//! - [`Predicate::equals_intention_plan`] -- matching a plan or norm guard
//!   against an intention.
//! - [`Predicate::equals_emotions`] -- comparing the `about` of emotions,
//!   ignoring the causing agent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::AgentId;

/// Key marking a conjunction built with [`Predicate::and`].
pub const AND_MARKER: &str = "and";

/// Key marking a disjunction built with [`Predicate::or`].
pub const OR_MARKER: &str = "or";

/// A named proposition with an optional key/value payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    /// Proposition name, e.g. `water`.
    pub name: String,
    /// Unordered payload. Empty means "any values".
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    /// Whether the proposition is asserted or denied.
    pub truth: bool,
    /// Agent held responsible for the proposition, if any.
    #[serde(default)]
    pub agent_cause: Option<AgentId>,
    /// Sub-goals of a composite predicate. When the predicate is promoted to
    /// an intention, each sub-goal becomes a desire the intention waits on.
    #[serde(default)]
    pub subgoals: Vec<Self>,
}

impl Predicate {
    /// Create a true predicate with no values and no cause.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            truth: true,
            agent_cause: None,
            subgoals: Vec::new(),
        }
    }

    /// Builder: attach a value under `key`.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder: set the truth flag.
    #[must_use]
    pub const fn with_truth(mut self, truth: bool) -> Self {
        self.truth = truth;
        self
    }

    /// Builder: set the causing agent.
    #[must_use]
    pub const fn with_cause(mut self, cause: AgentId) -> Self {
        self.agent_cause = Some(cause);
        self
    }

    /// Return a copy with the truth flag flipped.
    #[must_use]
    pub fn negated(&self) -> Self {
        let mut copy = self.clone();
        copy.truth = !copy.truth;
        copy
    }

    /// Build the conjunction `left_and_right`, satisfied once both sub-goals
    /// are achieved.
    pub fn and(left: Self, right: Self) -> Self {
        Self::composite(AND_MARKER, left, right)
    }

    /// Build the disjunction `left_or_right`, satisfied once either sub-goal
    /// is achieved.
    pub fn or(left: Self, right: Self) -> Self {
        Self::composite(OR_MARKER, left, right)
    }

    fn composite(marker: &str, left: Self, right: Self) -> Self {
        let name = format!("{}_{marker}_{}", left.name, right.name);
        let mut composite = Self::new(name).with_value(marker, true);
        composite.subgoals = vec![left, right];
        composite
    }

    /// True if this predicate was built with [`Predicate::and`].
    pub fn is_conjunction(&self) -> bool {
        self.values.contains_key(AND_MARKER)
    }

    /// True if this predicate was built with [`Predicate::or`].
    pub fn is_disjunction(&self) -> bool {
        self.values.contains_key(OR_MARKER)
    }

    fn is_unconstrained(&self) -> bool {
        self.values.is_empty() && self.agent_cause.is_none()
    }

    /// Full equality: same name and truth, compatible values and cause.
    ///
    /// A side with neither values nor cause acts as a wildcard. When both
    /// sides carry values, only the keys they share are compared and the
    /// cause is not consulted.
    pub fn equals(&self, other: &Self) -> bool {
        if self.name != other.name || self.truth != other.truth {
            return false;
        }
        if self.is_unconstrained() || other.is_unconstrained() {
            return true;
        }
        if !self.values.is_empty() && !other.values.is_empty() {
            return shared_values_agree(&self.values, &other.values);
        }
        match (self.agent_cause, other.agent_cause) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Same proposition with the opposite truth value.
    ///
    /// Used to find the belief or uncertainty a new one contradicts. Shared
    /// values are only compared when both sides name a cause.
    pub fn equals_but_not_truth(&self, other: &Self) -> bool {
        if self.name != other.name || self.truth == other.truth {
            return false;
        }
        if self.agent_cause.is_none() || other.agent_cause.is_none() {
            return true;
        }
        shared_values_agree(&self.values, &other.values)
    }

    /// Match a plan or norm guard against an intention predicate.
    pub fn equals_intention_plan(&self, other: &Self) -> bool {
        self.equals(other)
    }

    /// Equality for emotion `about` payloads: the cause is ignored.
    pub fn equals_emotions(&self, other: &Self) -> bool {
        self.name == other.name
            && self.truth == other.truth
            && shared_values_agree(&self.values, &other.values)
    }
}

impl core::fmt::Display for Predicate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)?;
        if !self.values.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in self.values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str("]")?;
        }
        write!(f, "({})", self.truth)
    }
}

/// Every key present on both sides maps to the same value.
fn shared_values_agree(left: &BTreeMap<String, Value>, right: &BTreeMap<String, Value>) -> bool {
    left.iter()
        .all(|(key, value)| right.get(key).is_none_or(|other| other == value))
}
