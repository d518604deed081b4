//! Read-only copies of other agents' state.
//!
//! Agents never read a partner's live [`CognitiveState`]. Before a tick
//! fans out, the runner takes one [`AgentSnapshot`] per agent; every
//! cross-agent read during that tick (social link updates, emotions about
//! partners, contagion, enforcement) goes through these copies.

use std::collections::BTreeMap;

use mindset_types::{AgentId, Emotion, MentalState, Modality};

use crate::cognitive::CognitiveState;
use crate::norms::NormBook;

/// Snapshots of the whole population, keyed by agent.
pub type SnapshotMap = BTreeMap<AgentId, AgentSnapshot>;

/// What other agents may observe of one agent during a tick.
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    /// The observed agent.
    pub agent: AgentId,
    /// Its emotion base.
    pub emotions: Vec<Emotion>,
    /// Its charisma disposition.
    pub charisma: f64,
    /// Its norm statuses.
    pub norms: NormBook,
    /// Its obligations.
    pub obligations: Vec<MentalState>,
}

impl AgentSnapshot {
    /// Copy the observable parts of `state`.
    pub fn of(state: &CognitiveState) -> Self {
        Self {
            agent: state.owner(),
            emotions: state.emotions().iter().cloned().collect(),
            charisma: state.dispositions.charisma,
            norms: state.norms.clone(),
            obligations: state.store().snapshot(Modality::Obligation),
        }
    }

    /// Emotions this agent holds that `cause` caused.
    pub fn emotions_caused_by(&self, cause: AgentId) -> impl Iterator<Item = &Emotion> {
        self.emotions
            .iter()
            .filter(move |emotion| emotion.agent_cause == Some(cause))
    }

    /// True if the agent holds an obligation equal to `obligation`.
    pub fn has_obligation(&self, obligation: &MentalState) -> bool {
        self.obligations.iter().any(|held| held.equals(obligation))
    }
}
