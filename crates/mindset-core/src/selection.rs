//! Choosing what to intend and how to pursue it.
//!
//! Four choices are made here: which desire becomes the next intention,
//! which desire answering an obligation does, which plan executes the
//! current intention, and which norm does. Each works in one of two modes:
//!
//! - **Deterministic**: candidates are shuffled, then the one with the
//!   strictly highest weight wins, so ties go to the shuffle order. Weights
//!   must exceed `f64::MIN_POSITIVE` to be chosen at all.
//! - **Probabilistic**: one candidate is drawn with probability
//!   proportional to its weight.
//!
//! Desires are weighted by strength, plans and norms by priority.

use mindset_agents::CognitiveState;
use mindset_types::{MentalState, MentalStateId, Modality, Predicate};
use tracing::debug;

use crate::collaborator::{GuardError, RandomSource, holds_or_absent};
use crate::library::{Library, Norm, Plan};
use crate::tick::TickError;

/// Priority of a plan or norm that declares none.
pub const DEFAULT_PRIORITY: f64 = 1.0;

/// Which guard of the library a desire must match to be a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    /// A plan's or norm's intention guard.
    Intention,
    /// A norm's obligation guard.
    Obligation,
}

// ---------------------------------------------------------------------------
// Intentions
// ---------------------------------------------------------------------------

/// Promote the best desire some plan or norm can serve.
///
/// Returns `true` if a new intention was added.
pub fn select_desire(
    state: &mut CognitiveState,
    library: &Library,
    rng: &mut impl RandomSource,
) -> Result<bool, TickError> {
    select_intention(state, library, rng, Purpose::Intention)
}

/// Promote the best desire some norm answers as an obligation.
///
/// Returns `true` if a new intention was added.
pub fn select_obligation(
    state: &mut CognitiveState,
    library: &Library,
    rng: &mut impl RandomSource,
) -> Result<bool, TickError> {
    select_intention(state, library, rng, Purpose::Obligation)
}

fn select_intention(
    state: &mut CognitiveState,
    library: &Library,
    rng: &mut impl RandomSource,
    purpose: Purpose,
) -> Result<bool, TickError> {
    let mut candidates: Vec<(MentalStateId, f64)> = state
        .store()
        .iter(Modality::Desire)
        .filter(|(_, desire)| is_candidate(desire, library, purpose))
        .filter(|(_, desire)| !state.store().contains(Modality::Intention, desire))
        .map(|(id, desire)| (id, desire.strength))
        .collect();
    if candidates.is_empty() {
        return Ok(false);
    }

    let chosen = if state.config.use_probabilistic_choice {
        let weights: Vec<f64> = candidates.iter().map(|(_, strength)| *strength).collect();
        rng.choose_weighted(&weights)
            .and_then(|index| candidates.get(index).copied())
    } else {
        rng.shuffle(&mut candidates);
        strictly_highest(candidates.iter().map(|(id, strength)| ((*id, *strength), *strength)))
    };
    let Some((source, strength)) = chosen else {
        return Ok(false);
    };

    let promoted = state.promote(source, strength)?;
    if let Some(intention) = promoted {
        debug!(
            agent_id = %state.owner(),
            %intention,
            strength,
            obligation = purpose == Purpose::Obligation,
            "intention selected"
        );
    }
    Ok(promoted.is_some())
}

fn is_candidate(desire: &MentalState, library: &Library, purpose: Purpose) -> bool {
    let Some(predicate) = desire.predicate() else {
        return false;
    };
    let matches = |guard: Option<&Predicate>| guard.is_some_and(|g| g.equals_intention_plan(predicate));
    match purpose {
        Purpose::Intention => {
            library
                .plans()
                .iter()
                .any(|plan| plan.intention.as_ref().is_none_or(|g| g.equals_intention_plan(predicate)))
                || library.norms().iter().any(|norm| matches(norm.intention.as_ref()))
        }
        Purpose::Obligation => library
            .norms()
            .iter()
            .any(|norm| matches(norm.obligation.as_ref())),
    }
}

/// Keep the first item whose weight strictly exceeds every earlier one
/// and `f64::MIN_POSITIVE`.
fn strictly_highest<T>(items: impl Iterator<Item = (T, f64)>) -> Option<T> {
    let mut best = None;
    let mut highest = f64::MIN_POSITIVE;
    for (item, weight) in items {
        if weight > highest {
            highest = weight;
            best = Some(item);
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Plans and norms
// ---------------------------------------------------------------------------

/// True if `plan` may execute the current intention right now.
pub fn plan_is_executable(plan: &Plan, state: &CognitiveState) -> Result<bool, GuardError> {
    if !holds_or_absent(plan.context.as_ref(), state)? {
        return Ok(false);
    }
    if let Some(guard) = &plan.intention {
        let serves = state
            .current_intention()
            .and_then(MentalState::predicate)
            .is_some_and(|current| guard.equals_intention_plan(current));
        if !serves {
            return Ok(false);
        }
    }
    let Some(emotion) = &plan.emotion else {
        return Ok(plan.threshold.is_none());
    };
    let Some(held) = state.emotion(emotion) else {
        return Ok(false);
    };
    match &plan.threshold {
        None => Ok(true),
        Some(threshold) => {
            let threshold = threshold.number(state, "plan threshold")?;
            Ok(held.intensity.is_some_and(|intensity| intensity >= threshold))
        }
    }
}

/// True if `norm` may execute the current intention right now.
///
/// A norm qualifies through its intention guard, or through its obligation
/// guard when the agent holds that obligation. Either way the agent's
/// obedience must reach the norm's threshold.
pub fn norm_is_executable(norm: &Norm, state: &CognitiveState) -> Result<bool, GuardError> {
    if !holds_or_absent(norm.context.as_ref(), state)? {
        return Ok(false);
    }
    let Some(current) = state.current_intention().and_then(MentalState::predicate) else {
        return Ok(false);
    };
    let serves_intention = norm
        .intention
        .as_ref()
        .is_some_and(|guard| guard.equals_intention_plan(current));
    let answers_obligation = norm.obligation.as_ref().is_some_and(|guard| {
        state.has_obligation(&MentalState::obligation(guard.clone()))
            && guard.equals_intention_plan(current)
    });
    if !serves_intention && !answers_obligation {
        return Ok(false);
    }
    match &norm.threshold {
        None => Ok(true),
        Some(threshold) => {
            let threshold = threshold.number(state, "norm threshold")?;
            Ok(state.dispositions.obedience >= threshold)
        }
    }
}

/// Every plan that could execute the current intention.
pub fn executable_plans<'l>(
    state: &CognitiveState,
    library: &'l Library,
) -> Result<Vec<&'l Plan>, GuardError> {
    let mut executable = Vec::new();
    for plan in library.plans() {
        if plan_is_executable(plan, state)? {
            executable.push(plan);
        }
    }
    Ok(executable)
}

/// Every norm that could execute the current intention.
pub fn executable_norms<'l>(
    state: &CognitiveState,
    library: &'l Library,
) -> Result<Vec<&'l Norm>, GuardError> {
    let mut executable = Vec::new();
    for norm in library.norms() {
        if norm_is_executable(norm, state)? {
            executable.push(norm);
        }
    }
    Ok(executable)
}

/// Choose the plan to execute the current intention.
pub fn select_plan<'l>(
    state: &CognitiveState,
    library: &'l Library,
    rng: &mut impl RandomSource,
) -> Result<Option<&'l Plan>, GuardError> {
    let mut weighted = Vec::new();
    for plan in executable_plans(state, library)? {
        let priority = match &plan.priority {
            Some(priority) => priority.number(state, "plan priority")?,
            None => DEFAULT_PRIORITY,
        };
        weighted.push((plan, priority));
    }
    let chosen = choose(weighted, state.config.use_probabilistic_choice, rng);
    if let Some(plan) = chosen {
        debug!(agent_id = %state.owner(), plan = %plan.name, "plan selected");
    }
    Ok(chosen)
}

/// Choose the norm to execute the current intention.
///
/// Every norm's sanction flag is reset first.
pub fn select_norm<'l>(
    state: &mut CognitiveState,
    library: &'l Library,
    rng: &mut impl RandomSource,
) -> Result<Option<&'l Norm>, GuardError> {
    state.norms.reset_sanctions();
    let mut weighted = Vec::new();
    for norm in executable_norms(state, library)? {
        let priority = match &norm.priority {
            Some(priority) => priority.number(state, "norm priority")?,
            None => DEFAULT_PRIORITY,
        };
        weighted.push((norm, priority));
    }
    let chosen = choose(weighted, state.config.use_probabilistic_choice, rng);
    if let Some(norm) = chosen {
        debug!(agent_id = %state.owner(), norm = %norm.name, "norm selected");
    }
    Ok(chosen)
}

fn choose<T: Copy>(
    mut weighted: Vec<(T, f64)>,
    probabilistic: bool,
    rng: &mut impl RandomSource,
) -> Option<T> {
    if weighted.is_empty() {
        return None;
    }
    if probabilistic {
        let weights: Vec<f64> = weighted.iter().map(|(_, w)| *w).collect();
        return rng
            .choose_weighted(&weights)
            .and_then(|index| weighted.get(index))
            .map(|(item, _)| *item);
    }
    rng.shuffle(&mut weighted);
    strictly_highest(weighted.into_iter())
}
