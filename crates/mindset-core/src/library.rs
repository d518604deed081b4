//! Behaviour library: plans, norms, laws, sanctions and triggers.
//!
//! A [`Library`] is built once by the behaviour layer and shared by every
//! agent of a population. Its entries are guards plus an executable
//! [`Behavior`]; the cycle in [`crate::tick`] decides which ones run.
//!
//! Entries are looked up by name. Agents remember the plan and norm they
//! are executing as names, so a library can be swapped between runs
//! without touching agent state.

use std::fmt;
use std::sync::Arc;

use mindset_agents::{CognitiveState, SnapshotMap};
use mindset_types::{AgentId, Emotion, Predicate};

use crate::collaborator::{Condition, Expr, GuardError};

// ---------------------------------------------------------------------------
// Execution scope
// ---------------------------------------------------------------------------

/// A sanction or reward was issued for a target's norm and the target
/// should remember it.
///
/// Targets are only reachable through snapshots during a tick, so marks
/// are collected and applied by the runner once every agent has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanctionMark {
    /// Agent whose norm status changes.
    pub target: AgentId,
    /// Norm to flag as sanctioned.
    pub norm: String,
}

/// What a running behaviour can see beyond its own agent.
#[derive(Debug)]
pub struct Situation<'a> {
    /// The tick being executed.
    pub tick: u64,
    /// Read-only copies of every agent, taken before the tick.
    pub population: &'a SnapshotMap,
    /// The library being executed.
    pub library: &'a Library,
    /// Sanction marks issued so far this tick.
    pub marks: Vec<SanctionMark>,
}

impl<'a> Situation<'a> {
    /// Start a scope for `tick`.
    pub const fn new(tick: u64, population: &'a SnapshotMap, library: &'a Library) -> Self {
        Self {
            tick,
            population,
            library,
            marks: Vec::new(),
        }
    }
}

/// Executable body of a plan, norm, sanction or trigger.
///
/// Implemented for every matching closure.
pub trait Behavior: Send + Sync {
    /// Run against the agent's state.
    fn run(&self, state: &mut CognitiveState, situation: &mut Situation<'_>) -> Result<(), GuardError>;
}

impl<F> Behavior for F
where
    F: Fn(&mut CognitiveState, &mut Situation<'_>) -> Result<(), GuardError> + Send + Sync,
{
    fn run(&self, state: &mut CognitiveState, situation: &mut Situation<'_>) -> Result<(), GuardError> {
        self(state, situation)
    }
}

impl fmt::Debug for dyn Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<behavior>")
    }
}

/// Box a closure as a shareable [`Behavior`].
pub fn behavior<F>(f: F) -> Arc<dyn Behavior>
where
    F: Fn(&mut CognitiveState, &mut Situation<'_>) -> Result<(), GuardError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn do_nothing(_state: &mut CognitiveState, _situation: &mut Situation<'_>) -> Result<(), GuardError> {
    Ok(())
}

/// A body that does nothing.
pub fn idle() -> Arc<dyn Behavior> {
    Arc::new(do_nothing)
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A way to achieve an intention.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique name within the library.
    pub name: String,
    /// Context guard. Absent means always.
    pub context: Option<Condition>,
    /// Intention this plan serves. Absent means any.
    pub intention: Option<Predicate>,
    /// Emotion that must be held.
    pub emotion: Option<Emotion>,
    /// Minimum intensity of `emotion`.
    pub threshold: Option<Expr<f64>>,
    /// Selection weight (default 1.0).
    pub priority: Option<Expr<f64>>,
    /// When true the cycle runs again within the same tick.
    pub instantaneous: Option<Condition>,
    /// When true after a run, the plan is finished.
    pub finished_when: Option<Condition>,
    /// What the plan does.
    pub body: Arc<dyn Behavior>,
}

impl Plan {
    /// A plan with no guards.
    pub fn new(name: impl Into<String>, body: Arc<dyn Behavior>) -> Self {
        Self {
            name: name.into(),
            context: None,
            intention: None,
            emotion: None,
            threshold: None,
            priority: None,
            instantaneous: None,
            finished_when: None,
            body,
        }
    }

    /// Builder: context guard.
    #[must_use]
    pub fn when(mut self, context: Condition) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: intention served.
    #[must_use]
    pub fn for_intention(mut self, intention: Predicate) -> Self {
        self.intention = Some(intention);
        self
    }

    /// Builder: emotion guard with an optional intensity threshold.
    #[must_use]
    pub fn on_emotion(mut self, emotion: Emotion, threshold: Option<Expr<f64>>) -> Self {
        self.emotion = Some(emotion);
        self.threshold = threshold;
        self
    }

    /// Builder: selection priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<Expr<f64>>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Builder: loop within the tick while `condition` holds.
    #[must_use]
    pub fn instantaneous(mut self, condition: Condition) -> Self {
        self.instantaneous = Some(condition);
        self
    }

    /// Builder: finished once `condition` holds.
    #[must_use]
    pub fn finished_when(mut self, condition: Condition) -> Self {
        self.finished_when = Some(condition);
        self
    }
}

/// A social norm or an answer to an obligation.
#[derive(Debug, Clone)]
pub struct Norm {
    /// Unique name within the library.
    pub name: String,
    /// Context guard. Absent means always.
    pub context: Option<Condition>,
    /// Intention this norm serves.
    pub intention: Option<Predicate>,
    /// Obligation this norm answers.
    pub obligation: Option<Predicate>,
    /// Minimum obedience for the norm to be followed.
    pub threshold: Option<Expr<f64>>,
    /// Selection weight (default 1.0).
    pub priority: Option<Expr<f64>>,
    /// Ticks a violation is remembered (default 1).
    pub lifetime: Option<u32>,
    /// When true the cycle runs again within the same tick.
    pub instantaneous: Option<Condition>,
    /// When true after a run, the norm is finished.
    pub finished_when: Option<Condition>,
    /// What following the norm does.
    pub body: Arc<dyn Behavior>,
}

impl Norm {
    /// A norm with no guards.
    pub fn new(name: impl Into<String>, body: Arc<dyn Behavior>) -> Self {
        Self {
            name: name.into(),
            context: None,
            intention: None,
            obligation: None,
            threshold: None,
            priority: None,
            lifetime: None,
            instantaneous: None,
            finished_when: None,
            body,
        }
    }

    /// Builder: context guard.
    #[must_use]
    pub fn when(mut self, context: Condition) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: intention served.
    #[must_use]
    pub fn for_intention(mut self, intention: Predicate) -> Self {
        self.intention = Some(intention);
        self
    }

    /// Builder: obligation answered.
    #[must_use]
    pub fn answering(mut self, obligation: Predicate) -> Self {
        self.obligation = Some(obligation);
        self
    }

    /// Builder: obedience threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: impl Into<Expr<f64>>) -> Self {
        self.threshold = Some(threshold.into());
        self
    }

    /// Builder: selection priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<Expr<f64>>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Builder: violation lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: u32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Builder: finished once `condition` holds.
    #[must_use]
    pub fn finished_when(mut self, condition: Condition) -> Self {
        self.finished_when = Some(condition);
        self
    }
}

/// A rule that imposes obligations when its guards hold.
#[derive(Debug, Clone)]
pub struct Law {
    /// Unique name within the library.
    pub name: String,
    /// Context guard. Absent means always.
    pub when: Option<Condition>,
    /// Belief that must be held.
    pub belief: Option<Predicate>,
    /// Further beliefs that must all be held.
    pub beliefs: Vec<Predicate>,
    /// Obligations imposed.
    pub obligations: Vec<Predicate>,
    /// Impose one obligation per held belief matching `belief`, carrying
    /// that belief's values.
    pub per_belief: bool,
    /// Strength of the imposed obligations.
    pub strength: Option<Expr<f64>>,
    /// Lifetime of the imposed obligations.
    pub lifetime: Option<u32>,
    /// Minimum obedience for the law to apply.
    pub threshold: Option<Expr<f64>>,
}

impl Law {
    /// A law imposing `obligation` unconditionally.
    pub fn new(name: impl Into<String>, obligation: Predicate) -> Self {
        Self {
            name: name.into(),
            when: None,
            belief: None,
            beliefs: Vec::new(),
            obligations: vec![obligation],
            per_belief: false,
            strength: None,
            lifetime: None,
            threshold: None,
        }
    }

    /// Builder: context guard.
    #[must_use]
    pub fn when(mut self, when: Condition) -> Self {
        self.when = Some(when);
        self
    }

    /// Builder: required belief.
    #[must_use]
    pub fn given(mut self, belief: Predicate) -> Self {
        self.belief = Some(belief);
        self
    }

    /// Builder: one obligation per matching belief.
    #[must_use]
    pub const fn per_belief(mut self) -> Self {
        self.per_belief = true;
        self
    }

    /// Builder: obligation strength.
    #[must_use]
    pub fn with_strength(mut self, strength: impl Into<Expr<f64>>) -> Self {
        self.strength = Some(strength.into());
        self
    }

    /// Builder: obligation lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: u32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Builder: obedience threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: impl Into<Expr<f64>>) -> Self {
        self.threshold = Some(threshold.into());
        self
    }
}

/// A named sanction or reward, run on the enforcing agent.
#[derive(Debug, Clone)]
pub struct Sanction {
    /// Unique name within the library.
    pub name: String,
    /// What the sanction does.
    pub body: Arc<dyn Behavior>,
}

impl Sanction {
    /// Create a sanction.
    pub fn new(name: impl Into<String>, body: Arc<dyn Behavior>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// When in the tick a trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TriggerPhase {
    /// Before rules: read the environment into beliefs.
    Perceive,
    /// After perception: derive mental states from mental states.
    Rule,
    /// After laws and social updates: react to emotions.
    Coping,
}

/// A reactive statement run every tick before deliberation.
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Name, for logs.
    pub name: String,
    /// When it fires.
    pub phase: TriggerPhase,
    /// Guard. Absent means always.
    pub when: Option<Condition>,
    /// What it does.
    pub body: Arc<dyn Behavior>,
}

impl Trigger {
    /// Create a trigger.
    pub fn new(name: impl Into<String>, phase: TriggerPhase, body: Arc<dyn Behavior>) -> Self {
        Self {
            name: name.into(),
            phase,
            when: None,
            body,
        }
    }

    /// Builder: guard.
    #[must_use]
    pub fn when(mut self, when: Condition) -> Self {
        self.when = Some(when);
        self
    }
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

/// Every behaviour available to a population.
#[derive(Debug, Clone, Default)]
pub struct Library {
    plans: Vec<Plan>,
    norms: Vec<Norm>,
    laws: Vec<Law>,
    sanctions: Vec<Sanction>,
    triggers: Vec<Trigger>,
}

impl Library {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a plan.
    #[must_use]
    pub fn plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    /// Builder: add a norm.
    #[must_use]
    pub fn norm(mut self, norm: Norm) -> Self {
        self.norms.push(norm);
        self
    }

    /// Builder: add a law.
    #[must_use]
    pub fn law(mut self, law: Law) -> Self {
        self.laws.push(law);
        self
    }

    /// Builder: add a sanction or reward.
    #[must_use]
    pub fn sanction(mut self, sanction: Sanction) -> Self {
        self.sanctions.push(sanction);
        self
    }

    /// Builder: add a trigger.
    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Every plan, in declaration order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Every norm, in declaration order.
    pub fn norms(&self) -> &[Norm] {
        &self.norms
    }

    /// Every law, in declaration order.
    pub fn laws(&self) -> &[Law] {
        &self.laws
    }

    /// Triggers of one phase, in declaration order.
    pub fn triggers(&self, phase: TriggerPhase) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter().filter(move |t| t.phase == phase)
    }

    /// Plan by name.
    pub fn find_plan(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name == name)
    }

    /// Norm by name.
    pub fn find_norm(&self, name: &str) -> Option<&Norm> {
        self.norms.iter().find(|n| n.name == name)
    }

    /// Sanction or reward by name.
    pub fn find_sanction(&self, name: &str) -> Option<&Sanction> {
        self.sanctions.iter().find(|s| s.name == name)
    }

    /// True if there is nothing to deliberate over.
    pub fn has_no_executors(&self) -> bool {
        self.plans.is_empty() && self.norms.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookups_by_name() {
        let library = Library::new()
            .plan(Plan::new("eat", idle()).for_intention(Predicate::new("fed")))
            .norm(Norm::new("queue", idle()).answering(Predicate::new("wait")))
            .sanction(Sanction::new("scold", idle()))
            .trigger(Trigger::new("look", TriggerPhase::Perceive, idle()))
            .trigger(Trigger::new("cope", TriggerPhase::Coping, idle()));

        assert!(library.find_plan("eat").is_some());
        assert!(library.find_plan("queue").is_none());
        assert_eq!(library.find_norm("queue").unwrap().lifetime, None);
        assert!(library.find_sanction("scold").is_some());
        assert_eq!(library.triggers(TriggerPhase::Coping).count(), 1);
        assert!(!library.has_no_executors());
        assert!(Library::new().has_no_executors());
    }

    #[test]
    fn law_defaults() {
        let law = Law::new("curfew", Predicate::new("stay_home"));
        assert_eq!(law.obligations.len(), 1);
        assert!(!law.per_belief);
        assert!(law.threshold.is_none());
    }
}
