//! Tick cycle: one agent's full cognitive step.
//!
//! Each call to [`run_tick`] runs these phases in order:
//!
//! 1. **Dispositions** -- recompute charisma, receptivity, persistence and
//!    obedience from personality (when enabled).
//!
//! 2. **Perception and rules** -- fire `Perceive` then `Rule` triggers.
//!
//! 3. **Laws** -- impose obligations whose guards hold.
//!
//! 4. **Social** -- drop links to departed agents, update link scores and
//!    derive emotions about partners (when enabled).
//!
//! 5. **Coping** -- fire `Coping` triggers.
//!
//! 6. **Deliberation** -- abandon intentions by chance, re-select an
//!    intention when needed, pick a norm or plan, execute it. Repeats while
//!    the executed behaviour is instantaneous, up to a configured cap.
//!
//! 7. **Bookkeeping** -- mark norms applied or violated, age norm
//!    violations and mental-state lifetimes, decay emotions.
//!
//! A [`GuardError`] from any collaborator aborts the rest of the tick for
//! this agent. Mutations already made stay in place.

use mindset_agents::{CognitionError, CognitionTunables, CognitiveState, SnapshotMap, social};
use mindset_types::{AgentId, MentalState, Modality, Predicate};
use tracing::{debug, warn};

use crate::collaborator::{Condition, GuardError, RandomSource, holds_or_absent};
use crate::library::{Law, Library, SanctionMark, Situation, TriggerPhase};
use crate::selection;

/// Errors that abort one agent's tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A guard or expression failed to evaluate.
    #[error("guard error: {source}")]
    Guard {
        /// The underlying collaborator error.
        #[from]
        source: GuardError,
    },

    /// A store operation failed.
    #[error("cognition error: {source}")]
    Cognition {
        /// The underlying cognition error.
        #[from]
        source: CognitionError,
    },
}

/// Whether a dispatched behaviour was a plan or a norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    /// A plan from the library.
    Plan,
    /// A norm from the library.
    Norm,
}

/// One execution of a plan or norm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Plan or norm.
    pub kind: ExecutorKind,
    /// Its name.
    pub name: String,
    /// Its finished guard held afterwards.
    pub finished: bool,
}

/// Summary of one agent's tick.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The agent.
    pub agent: AgentId,
    /// Plans and norms executed, in order.
    pub dispatched: Vec<Dispatch>,
    /// Deliberation passes run (more than one when instantaneous).
    pub iterations: u32,
    /// The instantaneous loop hit its cap.
    pub capped: bool,
    /// Current intention once the tick finished.
    pub intention: Option<MentalState>,
    /// Sanction marks to apply to other agents.
    pub marks: Vec<SanctionMark>,
}

impl ExecutionResult {
    const fn new(agent: AgentId) -> Self {
        Self {
            agent,
            dispatched: Vec::new(),
            iterations: 0,
            capped: false,
            intention: None,
            marks: Vec::new(),
        }
    }
}

/// Everything shared by the agents of one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// The tick being executed.
    pub tick: u64,
    /// Behaviour library.
    pub library: &'a Library,
    /// Snapshots of every agent, taken before the tick.
    pub population: &'a SnapshotMap,
    /// Numeric knobs.
    pub tunables: &'a CognitionTunables,
}

/// Run one full tick for one agent.
pub fn run_tick(
    state: &mut CognitiveState,
    context: &TickContext<'_>,
    rng: &mut impl RandomSource,
) -> Result<ExecutionResult, TickError> {
    let mut situation = Situation::new(context.tick, context.population, context.library);
    let mut result = ExecutionResult::new(state.owner());

    state.refresh_dispositions();
    run_triggers(state, TriggerPhase::Perceive, &mut situation)?;
    run_triggers(state, TriggerPhase::Rule, &mut situation)?;
    for law in context.library.laws() {
        apply_law(state, law)?;
    }
    if state.config.use_social_architecture {
        social::drop_departed_links(state, context.population);
        social::update_social_links(
            state,
            context.population,
            context.tunables.default_social_coefficient,
        );
        if state.config.use_emotion_architecture {
            social::emotions_related_to_others(state, context.population);
        }
    }
    run_triggers(state, TriggerPhase::Coping, &mut situation)?;

    deliberate(state, context, rng, &mut situation, &mut result)?;

    update_norm_statuses(state, context.library)?;
    state.norms.tick();
    state.age_mental_states();
    state.decay_emotions();

    result.intention = state.current_intention().cloned();
    result.marks = situation.marks;
    Ok(result)
}

// ---------------------------------------------------------------------------
// Triggers and laws
// ---------------------------------------------------------------------------

fn run_triggers(
    state: &mut CognitiveState,
    phase: TriggerPhase,
    situation: &mut Situation<'_>,
) -> Result<(), GuardError> {
    let library = situation.library;
    for trigger in library.triggers(phase) {
        if holds_or_absent(trigger.when.as_ref(), state)? {
            trigger.body.run(state, situation)?;
        }
    }
    Ok(())
}

/// Impose `law`'s obligations if its guards hold.
///
/// An obligation already held is not imposed again. Each new obligation
/// drops every intention, the current plan and the current norm. Returns
/// `true` if anything was imposed.
pub fn apply_law(state: &mut CognitiveState, law: &Law) -> Result<bool, GuardError> {
    if law.obligations.is_empty() || !holds_or_absent(law.when.as_ref(), state)? {
        return Ok(false);
    }
    let believes = |p: &Predicate| state.has_belief(&MentalState::belief(p.clone()));
    if !law.belief.as_ref().is_none_or(believes) || !law.beliefs.iter().all(believes) {
        return Ok(false);
    }
    if let Some(threshold) = &law.threshold {
        if state.dispositions.obedience < threshold.number(state, "law threshold")? {
            return Ok(false);
        }
    }
    let strength = law
        .strength
        .as_ref()
        .map(|s| s.number(state, "law strength"))
        .transpose()?;

    let imposed: Vec<Predicate> = match (&law.belief, law.per_belief) {
        (Some(belief), true) => {
            let matching: Vec<&Predicate> = state
                .mental_states(Modality::Belief)
                .filter_map(MentalState::predicate)
                .filter(|held| belief.equals(held))
                .collect();
            law.obligations
                .iter()
                .flat_map(|obligation| {
                    matching.iter().map(move |held| {
                        let mut specific = obligation.clone();
                        specific.values.clone_from(&held.values);
                        specific
                    })
                })
                .collect()
        }
        _ => law.obligations.clone(),
    };

    let mut added = false;
    for predicate in imposed {
        let mut obligation = MentalState::obligation(predicate);
        if let Some(strength) = strength {
            obligation = obligation.with_strength(strength);
        }
        if let Some(lifetime) = law.lifetime {
            obligation = obligation.with_lifetime(lifetime);
        }
        if state.has_obligation(&obligation) {
            continue;
        }
        debug!(agent_id = %state.owner(), law = %law.name, %obligation, "obligation imposed");
        state.add_obligation(obligation);
        state.current_norm = None;
        added = true;
    }
    Ok(added)
}

// ---------------------------------------------------------------------------
// Deliberation
// ---------------------------------------------------------------------------

fn deliberate(
    state: &mut CognitiveState,
    context: &TickContext<'_>,
    rng: &mut impl RandomSource,
    situation: &mut Situation<'_>,
    result: &mut ExecutionResult,
) -> Result<(), TickError> {
    if context.library.has_no_executors() {
        return Ok(());
    }
    let cap = context.tunables.max_instantaneous_iterations;
    loop {
        result.iterations = result.iterations.saturating_add(1);
        if !deliberation_pass(state, rng, situation, result)? {
            return Ok(());
        }
        if result.iterations >= cap {
            warn!(
                agent_id = %state.owner(),
                tick = context.tick,
                iterations = result.iterations,
                "instantaneous loop capped"
            );
            state.think(format!("stopped after {cap} instantaneous iterations"));
            result.capped = true;
            return Ok(());
        }
    }
}

/// One pass of deliberation. Returns `true` if the executed behaviour asks
/// for another pass within the same tick.
fn deliberation_pass(
    state: &mut CognitiveState,
    rng: &mut impl RandomSource,
    situation: &mut Situation<'_>,
    result: &mut ExecutionResult,
) -> Result<bool, TickError> {
    let library = situation.library;
    abandon_intentions(state, rng);

    if needs_new_intention(state, library)? {
        reselect(state, library, rng)?;
        state.current_plan = None;
        state.current_norm = None;
    }

    if !rng.flip(state.plan_persistence()) {
        if let Some(stopped) = state.current_plan.take() {
            state.think(format!("check what happens if I stop: {stopped}"));
        }
        if let Some(plan) = selection::select_plan(state, library, rng)? {
            state.current_plan = Some(plan.name.clone());
            state.think(format!("lets do instead {}", plan.name));
        }
    }

    let Some(current) = state.current_intention() else {
        state.think("I want nothing...");
        return Ok(false);
    };
    if current.predicate().is_none() {
        reselect(state, library, rng)?;
        if state.current_intention().is_none_or(|i| i.predicate().is_none()) {
            state.think("I want nothing...");
            return Ok(false);
        }
    }
    if let Some(label) = waiting_on_subintentions(state) {
        state.think(format!("waiting for the subintentions of {label}"));
        return Ok(false);
    }

    if state.current_plan.is_none() {
        choose_executor(state, library, rng)?;
    }
    dispatch(state, situation, result)
}

/// Drop the most recent intentions while the persistence flip fails.
fn abandon_intentions(state: &mut CognitiveState, rng: &mut impl RandomSource) {
    let keep = state.intention_persistence();
    let mut kept = rng.flip(keep);
    while !kept && !state.store().is_empty(Modality::Intention) {
        kept = rng.flip(keep);
        if let Some(dropped) = state.drop_last_intention() {
            debug!(agent_id = %state.owner(), intention = %dropped, "intention abandoned");
        }
    }
}

fn needs_new_intention(state: &mut CognitiveState, library: &Library) -> Result<bool, GuardError> {
    let waiting = match state.current_intention_id() {
        Some(id) => state.on_hold(id),
        None => false,
    };
    if waiting {
        return Ok(true);
    }
    let Some(current) = state.current_intention() else {
        return Ok(true);
    };
    if current.predicate().is_none() {
        return Ok(true);
    }
    Ok(selection::executable_plans(state, library)?.is_empty()
        && selection::executable_norms(state, library)?.is_empty())
}

fn reselect(
    state: &mut CognitiveState,
    library: &Library,
    rng: &mut impl RandomSource,
) -> Result<bool, TickError> {
    if selection::select_obligation(state, library, rng)? {
        return Ok(true);
    }
    selection::select_desire(state, library, rng)
}

/// Label of the current intention if some sub-goal on its hold list is
/// still desired.
fn waiting_on_subintentions(state: &CognitiveState) -> Option<String> {
    let current = state.current_intention()?;
    let hold = current.on_hold_until.as_ref()?;
    hold.iter()
        .any(|id| state.store().holds(Modality::Desire, *id))
        .then(|| current.to_string())
}

/// Pick the norm for the current intention, or a plan when no norm applies.
fn choose_executor(
    state: &mut CognitiveState,
    library: &Library,
    rng: &mut impl RandomSource,
) -> Result<(), GuardError> {
    let norm = selection::select_norm(state, library, rng)?;
    state.current_norm = norm.map(|n| n.name.clone());
    if let Some(norm) = norm {
        state.think(format!("use norm : {}", norm.name));
        return Ok(());
    }
    if let Some(plan) = selection::select_plan(state, library, rng)? {
        state.current_plan = Some(plan.name.clone());
        state.think(format!("use plan : {}", plan.name));
    }
    Ok(())
}

/// Execute the current norm, then the current plan.
fn dispatch(
    state: &mut CognitiveState,
    situation: &mut Situation<'_>,
    result: &mut ExecutionResult,
) -> Result<bool, TickError> {
    let library = situation.library;
    let mut again = false;

    if let Some(name) = state.current_norm.clone() {
        match library.find_norm(&name) {
            Some(norm) => {
                norm.body.run(state, situation)?;
                again |= holds_or_absent_false(norm.instantaneous.as_ref(), state)?;
                let finished = holds_or_absent_false(norm.finished_when.as_ref(), state)?;
                if finished {
                    state.current_norm = None;
                }
                debug!(agent_id = %state.owner(), norm = %name, finished, "norm executed");
                result.dispatched.push(Dispatch {
                    kind: ExecutorKind::Norm,
                    name,
                    finished,
                });
            }
            None => state.current_norm = None,
        }
    }

    if let Some(name) = state.current_plan.clone() {
        match library.find_plan(&name) {
            Some(plan) => {
                plan.body.run(state, situation)?;
                again |= holds_or_absent_false(plan.instantaneous.as_ref(), state)?;
                let finished = holds_or_absent_false(plan.finished_when.as_ref(), state)?;
                if finished {
                    state.current_plan = None;
                }
                debug!(agent_id = %state.owner(), plan = %name, finished, "plan executed");
                result.dispatched.push(Dispatch {
                    kind: ExecutorKind::Plan,
                    name,
                    finished,
                });
            }
            None => state.current_plan = None,
        }
    }
    Ok(again)
}

/// Evaluate an optional guard, where absence means "not satisfied".
fn holds_or_absent_false(
    condition: Option<&Condition>,
    state: &CognitiveState,
) -> Result<bool, GuardError> {
    condition.map_or(Ok(false), |c| c.holds(state))
}

// ---------------------------------------------------------------------------
// Norm bookkeeping
// ---------------------------------------------------------------------------

/// Mark every applicable norm applied (if it is the current norm) or
/// violated (otherwise).
///
/// A norm is applicable when its context holds and either its intention
/// guard is absent or matches the current intention (or there is no
/// intention), or its obligation guard matches the current intention.
pub fn update_norm_statuses(state: &mut CognitiveState, library: &Library) -> Result<(), GuardError> {
    for norm in library.norms() {
        if !holds_or_absent(norm.context.as_ref(), state)? {
            continue;
        }
        let current = state.current_intention();
        let matches_current = |guard: &Predicate| {
            current
                .and_then(MentalState::predicate)
                .is_some_and(|p| guard.equals_intention_plan(p))
        };
        let serves = current.is_none() || norm.intention.as_ref().is_none_or(matches_current);
        let answers = current.is_some() && norm.obligation.as_ref().is_some_and(matches_current);
        if !serves && !answers {
            continue;
        }
        let status = state.norms.entry(&norm.name);
        if state.current_norm.as_deref() == Some(norm.name.as_str()) {
            status.mark_applied();
        } else {
            status.mark_violated(norm.lifetime);
        }
    }
    Ok(())
}
