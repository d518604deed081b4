//! Per-agent cognitive state and the mental-state operations of the BDI
//! architecture.
//!
//! [`CognitiveState`] owns everything one agent thinks and feels: the six
//! modality stores, the emotion base, social links, the current plan and
//! norm, norm statuses, dispositions and the thought log. All mutation goes
//! through the methods here so that the cross-store bookkeeping happens
//! exactly once:
//!
//! - adding a belief revokes contradictions, resolves a matching intention
//!   and runs the appraisal rules;
//! - adding an obligation drops every standing intention;
//! - removing a desire removes its intention copy;
//! - every removal purges the record from other intentions' link lists.
//!
//! "Not found" and "already present" are ordinary outcomes reported as
//! `bool` or `Option`.

use std::collections::BTreeMap;

use mindset_types::{
    AgentId, Emotion, MentalState, MentalStateId, Modality, Personality, SocialLink,
};
use tracing::{debug, warn};

use crate::appraisal;
use crate::config::{CognitionTunables, EngineConfig};
use crate::emotions::EmotionBase;
use crate::error::CognitionError;
use crate::norms::NormBook;
use crate::personality::Dispositions;
use crate::store::MentalStateStore;
use crate::thoughts::ThoughtLog;

/// Modalities whose lifetimes are aged each tick, in aging order.
pub const AGED_MODALITIES: [Modality; 5] = [
    Modality::Belief,
    Modality::Desire,
    Modality::Intention,
    Modality::Uncertainty,
    Modality::Obligation,
];

/// Everything one agent thinks and feels.
#[derive(Debug, Clone)]
pub struct CognitiveState {
    owner: AgentId,
    /// Architecture switches.
    pub config: EngineConfig,
    /// OCEAN traits.
    pub personality: Personality,
    /// Derived or modeler-assigned dispositions.
    pub dispositions: Dispositions,
    /// Seconds simulated per tick, used by the decay formulas.
    pub time_step: f64,
    store: MentalStateStore,
    emotions: EmotionBase,
    social_links: BTreeMap<AgentId, SocialLink>,
    /// Name of the plan being executed.
    pub current_plan: Option<String>,
    /// Name of the norm being executed.
    pub current_norm: Option<String>,
    /// Runtime status of known norms.
    pub norms: NormBook,
    /// Recent trace notes.
    pub thoughts: ThoughtLog,
}

impl CognitiveState {
    /// Create an empty cognitive state for `owner`.
    pub fn new(owner: AgentId, config: EngineConfig, tunables: &CognitionTunables) -> Self {
        Self {
            owner,
            config,
            personality: Personality::default(),
            dispositions: Dispositions::default(),
            time_step: 1.0,
            store: MentalStateStore::new(owner),
            emotions: EmotionBase::new(),
            social_links: BTreeMap::new(),
            current_plan: None,
            current_norm: None,
            norms: NormBook::new(),
            thoughts: ThoughtLog::new(tunables.thought_capacity),
        }
    }

    /// Builder: set the personality.
    #[must_use]
    pub const fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// The agent this state belongs to.
    pub const fn owner(&self) -> AgentId {
        self.owner
    }

    /// Read access to the mental-state stores.
    pub const fn store(&self) -> &MentalStateStore {
        &self.store
    }

    /// Raw store access. Bypasses appraisal and cross-store bookkeeping.
    pub const fn store_mut(&mut self) -> &mut MentalStateStore {
        &mut self.store
    }

    /// Read access to the emotion base.
    pub const fn emotions(&self) -> &EmotionBase {
        &self.emotions
    }

    /// Record a trace note.
    pub fn think(&mut self, note: impl Into<String>) {
        self.thoughts.record(note);
    }

    /// Recompute dispositions from personality when personality is enabled.
    pub fn refresh_dispositions(&mut self) {
        if self.config.use_personality {
            self.dispositions = Dispositions::from_personality(&self.personality);
        }
    }

    /// Probability of keeping the current intention this tick.
    pub const fn intention_persistence(&self) -> f64 {
        if self.config.use_persistence {
            self.dispositions.intention_persistence
        } else {
            1.0
        }
    }

    /// Probability of keeping the current plan this tick.
    pub const fn plan_persistence(&self) -> f64 {
        if self.config.use_persistence {
            self.dispositions.plan_persistence
        } else {
            1.0
        }
    }

    // -----------------------------------------------------------------------
    // Additions
    // -----------------------------------------------------------------------

    /// Add a belief.
    ///
    /// Runs appraisal first, then revokes the contradicting belief, resolves
    /// an intention equal to the belief (dropping its desire, plan and
    /// norm), drops equal or contradicting uncertainties and an equal
    /// obligation, and unlinks the belief from intention hold lists.
    pub fn add_belief(&mut self, belief: MentalState) -> bool {
        let belief = self.stamp(belief, Modality::Belief);
        if self.config.use_emotion_architecture {
            appraisal::appraise_belief(self, &belief);
        }
        if let Some(predicate) = belief.predicate() {
            self.store.remove_where(Modality::Belief, |held| {
                held.predicate()
                    .is_some_and(|other| other.equals_but_not_truth(predicate))
            });
        }
        if self.store.contains(Modality::Intention, &belief) {
            self.store.remove(Modality::Desire, &belief);
            self.store.remove(Modality::Intention, &belief);
            self.current_plan = None;
            self.current_norm = None;
            debug!(agent_id = %self.owner, belief = %belief, "intention achieved");
        }
        self.store.remove(Modality::Uncertainty, &belief);
        self.store.remove(Modality::Obligation, &belief);
        if let Some(predicate) = belief.predicate() {
            self.store.remove_where(Modality::Uncertainty, |held| {
                held.predicate()
                    .is_some_and(|other| other.equals_but_not_truth(predicate))
            });
        }
        self.store.unlink_matching(&belief);
        self.add_plain(belief)
    }

    /// Add a desire, optionally as a sub-goal of `super_intention`.
    ///
    /// The link is recorded even when an equal desire already exists.
    pub fn add_desire(&mut self, super_intention: Option<MentalStateId>, desire: MentalState) -> bool {
        let mut desire = self.stamp(desire, Modality::Desire);
        let parent = super_intention.filter(|id| {
            self.store
                .get(*id)
                .is_some_and(|parent| parent.predicate().is_some())
        });
        if let Some(existing) = self.store.find(Modality::Desire, &desire) {
            if let Some(parent) = parent {
                self.link_subintention(parent, existing);
            }
            return false;
        }
        desire.super_intention = parent;
        let Some(id) = self.insert_logged(desire) else {
            return false;
        };
        if let Some(parent) = parent {
            self.link_subintention(parent, id);
        }
        true
    }

    /// Add an uncertainty, revoking contradicting beliefs and uncertainties
    /// and running the hope/fear appraisal.
    pub fn add_uncertainty(&mut self, uncertainty: MentalState) -> bool {
        let uncertainty = self.stamp(uncertainty, Modality::Uncertainty);
        if let Some(predicate) = uncertainty.predicate() {
            let contradicts = |held: &MentalState| {
                held.predicate()
                    .is_some_and(|other| other.equals_but_not_truth(predicate))
            };
            self.store.remove_where(Modality::Belief, contradicts);
            self.store.remove_where(Modality::Uncertainty, contradicts);
        }
        if self.config.use_emotion_architecture {
            appraisal::appraise_uncertainty(self, &uncertainty);
        }
        self.add_plain(uncertainty)
    }

    /// Add an ideal.
    pub fn add_ideal(&mut self, ideal: MentalState) -> bool {
        let ideal = self.stamp(ideal, Modality::Ideal);
        self.add_plain(ideal)
    }

    /// Add an obligation. Every standing intention and the current plan are
    /// dropped first, whether or not the obligation is new.
    pub fn add_obligation(&mut self, obligation: MentalState) -> bool {
        let obligation = self.stamp(obligation, Modality::Obligation);
        self.clear_intentions();
        self.add_plain(obligation)
    }

    /// Add an intention directly, bypassing selection.
    pub fn add_intention(&mut self, intention: MentalState) -> bool {
        let intention = self.stamp(intention, Modality::Intention);
        self.add_plain(intention)
    }

    /// Drop every intention and the current plan.
    pub fn clear_intentions(&mut self) {
        self.store.clear(Modality::Intention);
        self.current_plan = None;
    }

    // -----------------------------------------------------------------------
    // Removals
    // -----------------------------------------------------------------------

    /// Remove a belief.
    pub fn remove_belief(&mut self, belief: &MentalState) -> bool {
        self.remove_matching(Modality::Belief, belief)
    }

    /// Remove a desire together with its intention copy.
    pub fn remove_desire(&mut self, desire: &MentalState) -> bool {
        self.remove_matching(Modality::Desire, desire)
    }

    /// Remove an intention.
    pub fn remove_intention(&mut self, intention: &MentalState) -> bool {
        self.remove_matching(Modality::Intention, intention)
    }

    /// Remove an uncertainty.
    pub fn remove_uncertainty(&mut self, uncertainty: &MentalState) -> bool {
        self.remove_matching(Modality::Uncertainty, uncertainty)
    }

    /// Remove an ideal.
    pub fn remove_ideal(&mut self, ideal: &MentalState) -> bool {
        self.remove_matching(Modality::Ideal, ideal)
    }

    /// Remove an obligation.
    pub fn remove_obligation(&mut self, obligation: &MentalState) -> bool {
        self.remove_matching(Modality::Obligation, obligation)
    }

    fn remove_matching(&mut self, modality: Modality, state: &MentalState) -> bool {
        match self.store.find(modality, state) {
            Some(id) => self.remove_entry(id),
            None => false,
        }
    }

    /// Remove the record `id` with the cascade of its modality.
    pub fn remove_entry(&mut self, id: MentalStateId) -> bool {
        let Some(removed) = self.store.remove_id(id) else {
            return false;
        };
        if removed.modality == Modality::Desire {
            self.store.remove(Modality::Intention, &removed);
        }
        self.store.unlink_matching(&removed);
        true
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// True if an equal belief is held.
    pub fn has_belief(&self, belief: &MentalState) -> bool {
        self.store.contains(Modality::Belief, belief)
    }

    /// True if an equal desire is held.
    pub fn has_desire(&self, desire: &MentalState) -> bool {
        self.store.contains(Modality::Desire, desire)
    }

    /// True if an equal intention is held.
    pub fn has_intention(&self, intention: &MentalState) -> bool {
        self.store.contains(Modality::Intention, intention)
    }

    /// True if an equal uncertainty is held.
    pub fn has_uncertainty(&self, uncertainty: &MentalState) -> bool {
        self.store.contains(Modality::Uncertainty, uncertainty)
    }

    /// True if an equal ideal is held.
    pub fn has_ideal(&self, ideal: &MentalState) -> bool {
        self.store.contains(Modality::Ideal, ideal)
    }

    /// True if an equal obligation is held.
    pub fn has_obligation(&self, obligation: &MentalState) -> bool {
        self.store.contains(Modality::Obligation, obligation)
    }

    /// Records held in `modality`, oldest first.
    pub fn mental_states(&self, modality: Modality) -> impl Iterator<Item = &MentalState> {
        self.store.iter(modality).map(|(_, state)| state)
    }

    /// The current intention: the most recent entry of the intention store.
    pub fn current_intention(&self) -> Option<&MentalState> {
        self.current_intention_id().and_then(|id| self.store.get(id))
    }

    /// Id of the current intention.
    pub fn current_intention_id(&self) -> Option<MentalStateId> {
        self.store.last(Modality::Intention)
    }

    /// The intention record `id`, if it is still an intention.
    pub fn intention_of(&self, id: MentalStateId) -> Option<&MentalState> {
        if self.store.holds(Modality::Intention, id) {
            self.store.get(id)
        } else {
            None
        }
    }

    /// The belief whose embedded mental state equals `about`.
    pub fn find_belief_about(&self, about: &MentalState) -> Option<&MentalState> {
        self.mental_states(Modality::Belief)
            .find(|belief| belief.embedded().is_some_and(|inner| inner.equals(about)))
    }

    // -----------------------------------------------------------------------
    // Emotions
    // -----------------------------------------------------------------------

    /// Add an emotion, merging with an existing one of the same identity.
    pub fn add_emotion(&mut self, emotion: Emotion) -> bool {
        debug!(agent_id = %self.owner, emotion = %emotion, "emotion added");
        self.emotions.add(self.owner, emotion);
        true
    }

    /// Remove an emotion. Returns whether it was present.
    pub fn remove_emotion(&mut self, emotion: &Emotion) -> bool {
        self.emotions.remove(emotion)
    }

    /// True if an emotion with the same identity is held.
    pub fn has_emotion(&self, emotion: &Emotion) -> bool {
        self.emotions.contains(emotion)
    }

    /// The held emotion with the same identity as `emotion`.
    pub fn emotion(&self, emotion: &Emotion) -> Option<&Emotion> {
        self.emotions.get(emotion)
    }

    /// Apply one tick of emotion decay, evicting faded emotions.
    pub fn decay_emotions(&mut self) {
        for faded in self.emotions.decay() {
            debug!(agent_id = %self.owner, emotion = %faded, "emotion faded");
        }
    }

    // -----------------------------------------------------------------------
    // Social links
    // -----------------------------------------------------------------------

    /// Add a link. Rejected when a score is out of range or a link to the
    /// same agent exists.
    pub fn add_social_link(&mut self, link: SocialLink) -> bool {
        if !link.is_within_bounds() || self.social_links.contains_key(&link.agent) {
            return false;
        }
        self.social_links.insert(link.agent, link);
        true
    }

    /// The link towards `agent`.
    pub fn social_link(&self, agent: &AgentId) -> Option<&SocialLink> {
        self.social_links.get(agent)
    }

    /// The link towards `agent`, for mutation.
    pub fn social_link_mut(&mut self, agent: &AgentId) -> Option<&mut SocialLink> {
        self.social_links.get_mut(agent)
    }

    /// Remove the link towards `agent`.
    pub fn remove_social_link(&mut self, agent: &AgentId) -> bool {
        self.social_links.remove(agent).is_some()
    }

    /// All links, ordered by partner id.
    pub fn social_links(&self) -> impl Iterator<Item = &SocialLink> {
        self.social_links.values()
    }

    /// Keep only the links whose partner satisfies `keep`.
    pub fn retain_social_links(&mut self, mut keep: impl FnMut(&AgentId) -> bool) {
        self.social_links.retain(|agent, _| keep(agent));
    }

    // -----------------------------------------------------------------------
    // Deliberation support
    // -----------------------------------------------------------------------

    /// Drop the most recent intention along with the current plan and norm.
    pub fn drop_last_intention(&mut self) -> Option<MentalState> {
        let id = self.store.last(Modality::Intention)?;
        let dropped = self.store.remove_id(id)?;
        self.store.unlink_matching(&dropped);
        self.think(format!("check what happens if I remove: {dropped}"));
        self.current_plan = None;
        self.current_norm = None;
        Some(dropped)
    }

    /// Turn the desire (or obligation-answering desire) `source` into a new
    /// intention with the given strength.
    ///
    /// Composite sub-goals are added as desires and, together with the
    /// desire's own linked sub-goals still present, become the intention's
    /// hold list. Returns `None` when an equal intention already exists or
    /// the source cannot be intended.
    pub fn promote(
        &mut self,
        source: MentalStateId,
        strength: f64,
    ) -> Result<Option<MentalStateId>, CognitionError> {
        let Some(source_state) = self.store.get(source).cloned() else {
            return Ok(None);
        };
        if source_state.emotion().is_some() {
            return Ok(None);
        }
        let mut intention = source_state.as_modality(Modality::Intention);
        intention.strength = strength;
        intention.owner = Some(self.owner);
        if self.store.contains(Modality::Intention, &intention) {
            return Ok(None);
        }

        let mut hold = Vec::new();
        if let Some(predicate) = source_state.predicate() {
            for subgoal in &predicate.subgoals {
                let desire = MentalState::desire(subgoal.clone()).owned_by(self.owner);
                let id = match self.store.find(Modality::Desire, &desire) {
                    Some(id) => id,
                    None => self.store.insert(desire)?,
                };
                if !hold.contains(&id) {
                    hold.push(id);
                }
            }
        }
        for link in &source_state.subintentions {
            if self.store.holds(Modality::Desire, *link) && !hold.contains(link) {
                hold.push(*link);
            }
        }
        if !hold.is_empty() {
            intention.subintentions.clone_from(&hold);
            intention.on_hold_until = Some(hold.clone());
        }
        let id = self.store.insert(intention)?;
        for sub in hold {
            if let Some(desire) = self.store.get_mut(sub) {
                desire.super_intention = Some(id);
            }
        }
        debug!(agent_id = %self.owner, intention = %id, strength, "intention promoted");
        Ok(Some(id))
    }

    /// Decide whether `intention` is still waiting on sub-goals.
    ///
    /// Conjunctions release (and are removed) once every sub-goal is gone;
    /// disjunctions release once at most one alternative is left, dropping
    /// that alternative too. A plain hold list waits while any listed
    /// desire is still held; on release the hold list and current plan are
    /// cleared.
    pub fn on_hold(&mut self, intention: MentalStateId) -> bool {
        let Some(record) = self.store.get(intention) else {
            return false;
        };
        let Some(predicate) = record.predicate() else {
            return false;
        };
        let Some(hold) = record.on_hold_until.clone() else {
            return false;
        };
        if predicate.is_conjunction() {
            if hold.is_empty() {
                self.release_composite(intention);
                return false;
            }
            return true;
        }
        if predicate.is_disjunction() {
            if hold.len() <= 1 {
                if let Some(remaining) = hold.first() {
                    if self.store.holds(Modality::Desire, *remaining) {
                        self.store.remove_id(*remaining);
                    }
                }
                self.release_composite(intention);
                return false;
            }
            return true;
        }
        if self.store.is_empty(Modality::Desire) {
            return false;
        }
        if hold.iter().any(|id| self.store.holds(Modality::Desire, *id)) {
            return true;
        }
        let label = self
            .store
            .get(intention)
            .map(ToString::to_string)
            .unwrap_or_default();
        self.think(format!("no more subintention for {label}"));
        if let Some(record) = self.store.get_mut(intention) {
            record.on_hold_until = None;
        }
        self.current_plan = None;
        false
    }

    /// Remove a satisfied composite intention and its desire.
    fn release_composite(&mut self, intention: MentalStateId) {
        if let Some(removed) = self.store.remove_id(intention) {
            self.store.remove(Modality::Desire, &removed);
            self.store.unlink_matching(&removed);
            debug!(agent_id = %self.owner, intention = %removed, "composite intention released");
        }
    }

    /// Decrement lifetimes and evict expired records, modality by modality.
    pub fn age_mental_states(&mut self) {
        for modality in AGED_MODALITIES {
            for id in self.store.age(modality) {
                if self.remove_entry(id) {
                    debug!(agent_id = %self.owner, %modality, record = %id, "mental state expired");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn stamp(&self, mut state: MentalState, modality: Modality) -> MentalState {
        state.modality = modality;
        state.owner = Some(self.owner);
        state
    }

    fn add_plain(&mut self, state: MentalState) -> bool {
        if self.store.contains(state.modality, &state) {
            return false;
        }
        self.insert_logged(state).is_some()
    }

    fn insert_logged(&mut self, state: MentalState) -> Option<MentalStateId> {
        match self.store.insert(state) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(agent_id = %self.owner, %error, "mental state dropped");
                None
            }
        }
    }

    fn link_subintention(&mut self, parent: MentalStateId, child: MentalStateId) {
        if let Some(record) = self.store.get_mut(parent) {
            if !record.subintentions.contains(&child) {
                record.subintentions.push(child);
            }
        }
        if let Some(record) = self.store.get_mut(child) {
            record.super_intention = Some(parent);
        }
    }
}
