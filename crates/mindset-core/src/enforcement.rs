//! Social enforcement of norms and obligations.
//!
//! An enforcer observes a target (through its snapshot) and, depending on
//! the target's norm statuses, runs a named sanction or reward from the
//! library on itself. Only the enforcer's state changes; the target learns
//! that a norm was sanctioned through a [`SanctionMark`] applied after the
//! tick.

use mindset_agents::{AgentSnapshot, CognitiveState};
use mindset_types::{MentalState, Predicate};
use tracing::debug;

use crate::collaborator::{Condition, GuardError, holds_or_absent};
use crate::library::{SanctionMark, Situation};

/// What is being enforced on the target.
#[derive(Debug, Clone)]
pub enum Enforced {
    /// A norm, by name.
    Norm(String),
    /// An obligation the target may hold.
    Obligation(Predicate),
}

/// One enforcement request.
#[derive(Debug, Clone)]
pub struct Enforcement {
    /// Guard evaluated on the enforcer. Absent means always.
    pub when: Option<Condition>,
    /// What is checked on the target.
    pub enforced: Enforced,
    /// Sanction run when the target failed.
    pub sanction: Option<String>,
    /// Reward run when the target complied.
    pub reward: Option<String>,
}

impl Enforcement {
    /// Check a norm by name.
    pub fn norm(name: impl Into<String>) -> Self {
        Self {
            when: None,
            enforced: Enforced::Norm(name.into()),
            sanction: None,
            reward: None,
        }
    }

    /// Check an obligation.
    pub const fn obligation(obligation: Predicate) -> Self {
        Self {
            when: None,
            enforced: Enforced::Obligation(obligation),
            sanction: None,
            reward: None,
        }
    }

    /// Builder: guard.
    #[must_use]
    pub fn when(mut self, when: Condition) -> Self {
        self.when = Some(when);
        self
    }

    /// Builder: sanction name.
    #[must_use]
    pub fn sanction(mut self, sanction: impl Into<String>) -> Self {
        self.sanction = Some(sanction.into());
        self
    }

    /// Builder: reward name.
    #[must_use]
    pub fn reward(mut self, reward: impl Into<String>) -> Self {
        self.reward = Some(reward.into());
        self
    }
}

/// Enforce `request` on `target`, running the chosen sanction or reward on
/// `enforcer`.
///
/// Returns the name of what ran, if anything. A name missing from the
/// library runs nothing.
pub fn enforce(
    enforcer: &mut CognitiveState,
    target: &AgentSnapshot,
    request: &Enforcement,
    situation: &mut Situation<'_>,
) -> Result<Option<String>, GuardError> {
    if !holds_or_absent(request.when.as_ref(), enforcer)? {
        return Ok(None);
    }
    match &request.enforced {
        Enforced::Norm(name) => {
            let Some(status) = target.norms.get(name) else {
                return Ok(None);
            };
            let verdict = if status.violated {
                request.sanction.as_deref()
            } else if status.applied {
                request.reward.as_deref()
            } else {
                None
            };
            match verdict {
                Some(verdict) => run_named(enforcer, verdict, situation),
                None => Ok(None),
            }
        }
        Enforced::Obligation(obligation) => {
            if !target.has_obligation(&MentalState::obligation(obligation.clone())) {
                return Ok(None);
            }
            let library = situation.library;
            for norm in library.norms() {
                let answers = norm.obligation.as_ref().is_some_and(|o| o.equals(obligation));
                if !answers {
                    continue;
                }
                let status = target.norms.get(&norm.name).copied().unwrap_or_default();
                if status.sanctioned {
                    continue;
                }
                let verdict = if status.applied {
                    request.reward.as_deref().or(request.sanction.as_deref())
                } else {
                    request.sanction.as_deref()
                };
                let Some(verdict) = verdict else {
                    continue;
                };
                let ran = run_named(enforcer, verdict, situation)?;
                if ran.is_some() {
                    situation.marks.push(SanctionMark {
                        target: target.agent,
                        norm: norm.name.clone(),
                    });
                    return Ok(ran);
                }
            }
            Ok(None)
        }
    }
}

fn run_named(
    enforcer: &mut CognitiveState,
    name: &str,
    situation: &mut Situation<'_>,
) -> Result<Option<String>, GuardError> {
    let library = situation.library;
    let Some(sanction) = library.find_sanction(name) else {
        debug!(agent_id = %enforcer.owner(), sanction = name, "unknown sanction");
        return Ok(None);
    };
    sanction.body.run(enforcer, situation)?;
    debug!(agent_id = %enforcer.owner(), sanction = name, "sanction executed");
    Ok(Some(sanction.name.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_agents::{CognitionTunables, EngineConfig, NormBook, SnapshotMap};
    use mindset_types::AgentId;

    use super::*;
    use crate::library::{Library, Norm, Sanction, behavior, idle};

    fn state() -> CognitiveState {
        CognitiveState::new(
            AgentId::new(),
            EngineConfig::default(),
            &CognitionTunables::default(),
        )
    }

    fn marker(name: &'static str) -> Sanction {
        Sanction::new(
            name,
            behavior(move |state, _| {
                state.add_belief(MentalState::belief(Predicate::new(name)));
                Ok(())
            }),
        )
    }

    fn library() -> Library {
        Library::new()
            .norm(Norm::new("queue", idle()).answering(Predicate::new("wait")))
            .sanction(marker("scold"))
            .sanction(marker("thank"))
    }

    fn target(norms: NormBook, obligations: Vec<MentalState>) -> AgentSnapshot {
        AgentSnapshot {
            agent: AgentId::new(),
            emotions: Vec::new(),
            charisma: 1.0,
            norms,
            obligations,
        }
    }

    fn has(state: &CognitiveState, name: &str) -> bool {
        state.has_belief(&MentalState::belief(Predicate::new(name)))
    }

    #[test]
    fn violated_norm_is_sanctioned() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let mut norms = NormBook::new();
        norms.entry("queue").mark_violated(None);
        let request = Enforcement::norm("queue").sanction("scold").reward("thank");

        let ran = enforce(&mut enforcer, &target(norms, Vec::new()), &request, &mut situation).unwrap();
        assert_eq!(ran.as_deref(), Some("scold"));
        assert!(has(&enforcer, "scold"));
        assert!(!has(&enforcer, "thank"));
        assert!(situation.marks.is_empty());
    }

    #[test]
    fn applied_norm_is_rewarded() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let mut norms = NormBook::new();
        norms.entry("queue").mark_applied();
        let request = Enforcement::norm("queue").sanction("scold").reward("thank");

        enforce(&mut enforcer, &target(norms, Vec::new()), &request, &mut situation).unwrap();
        assert!(has(&enforcer, "thank"));
    }

    #[test]
    fn unknown_norm_does_nothing() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let request = Enforcement::norm("queue").sanction("scold");
        let ran = enforce(&mut enforcer, &target(NormBook::new(), Vec::new()), &request, &mut situation);
        assert_eq!(ran.unwrap(), None);
    }

    #[test]
    fn held_obligation_sanctions_and_marks_the_answering_norm() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let wait = MentalState::obligation(Predicate::new("wait"));
        let observed = target(NormBook::new(), vec![wait]);
        let request = Enforcement::obligation(Predicate::new("wait")).sanction("scold");

        let ran = enforce(&mut enforcer, &observed, &request, &mut situation).unwrap();
        assert_eq!(ran.as_deref(), Some("scold"));
        assert_eq!(
            situation.marks,
            vec![SanctionMark {
                target: observed.agent,
                norm: "queue".to_owned()
            }]
        );
    }

    #[test]
    fn already_sanctioned_norm_is_skipped() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let mut norms = NormBook::new();
        norms.entry("queue").sanctioned = true;
        let observed = target(norms, vec![MentalState::obligation(Predicate::new("wait"))]);
        let request = Enforcement::obligation(Predicate::new("wait")).sanction("scold");

        assert_eq!(enforce(&mut enforcer, &observed, &request, &mut situation).unwrap(), None);
    }

    #[test]
    fn failing_guard_skips_enforcement() {
        let library = library();
        let population = SnapshotMap::new();
        let mut situation = Situation::new(1, &population, &library);
        let mut enforcer = state();
        let mut norms = NormBook::new();
        norms.entry("queue").mark_violated(None);
        let request = Enforcement::norm("queue").sanction("scold").when(Condition::Never);
        let ran = enforce(&mut enforcer, &target(norms, Vec::new()), &request, &mut situation);
        assert_eq!(ran.unwrap(), None);
    }
}
