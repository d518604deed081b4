//! Arena-backed mental-state store.
//!
//! Every record of one agent lives in a single arena keyed by
//! [`MentalStateId`]. Each modality keeps an ordered list of the ids it
//! holds; the order is insertion order and the last intention is the
//! current one. Removing a record purges its id from every other record's
//! subintention and on-hold lists, so links never dangle.
//!
//! Lookups use [`MentalState::equals`], which ignores strength, lifetime
//! and links.

use std::collections::BTreeMap;

use mindset_types::{AgentId, MentalState, MentalStateId, Modality};

use crate::error::CognitionError;

/// Ordered per-modality collections over one arena.
#[derive(Debug, Clone)]
pub struct MentalStateStore {
    owner: AgentId,
    records: BTreeMap<MentalStateId, MentalState>,
    order: BTreeMap<Modality, Vec<MentalStateId>>,
    next_id: Option<MentalStateId>,
}

impl MentalStateStore {
    /// Create an empty store for `owner`.
    pub const fn new(owner: AgentId) -> Self {
        Self {
            owner,
            records: BTreeMap::new(),
            order: BTreeMap::new(),
            next_id: Some(MentalStateId::FIRST),
        }
    }

    /// Resolve an id.
    pub fn get(&self, id: MentalStateId) -> Option<&MentalState> {
        self.records.get(&id)
    }

    /// Resolve an id for mutation.
    pub fn get_mut(&mut self, id: MentalStateId) -> Option<&mut MentalState> {
        self.records.get_mut(&id)
    }

    /// Ids held by `modality`, oldest first.
    pub fn ids(&self, modality: Modality) -> &[MentalStateId] {
        self.order.get(&modality).map_or(&[], Vec::as_slice)
    }

    /// Records held by `modality`, oldest first.
    pub fn iter(&self, modality: Modality) -> impl Iterator<Item = (MentalStateId, &MentalState)> {
        self.ids(modality)
            .iter()
            .filter_map(|id| self.records.get(id).map(|state| (*id, state)))
    }

    /// Number of records in `modality`.
    pub fn len(&self, modality: Modality) -> usize {
        self.ids(modality).len()
    }

    /// True if `modality` holds nothing.
    pub fn is_empty(&self, modality: Modality) -> bool {
        self.ids(modality).is_empty()
    }

    /// Most recently added record of `modality`.
    pub fn last(&self, modality: Modality) -> Option<MentalStateId> {
        self.ids(modality).last().copied()
    }

    /// True if `id` is currently listed under `modality`.
    pub fn holds(&self, modality: Modality, id: MentalStateId) -> bool {
        self.ids(modality).contains(&id)
    }

    /// First record of `modality` equal to `state`.
    pub fn find(&self, modality: Modality, state: &MentalState) -> Option<MentalStateId> {
        self.find_where(modality, |candidate| candidate.equals(state))
    }

    /// First record of `modality` satisfying `test`.
    pub fn find_where(
        &self,
        modality: Modality,
        test: impl Fn(&MentalState) -> bool,
    ) -> Option<MentalStateId> {
        self.iter(modality)
            .find(|(_, candidate)| test(candidate))
            .map(|(id, _)| id)
    }

    /// True if `modality` holds a record equal to `state`.
    pub fn contains(&self, modality: Modality, state: &MentalState) -> bool {
        self.find(modality, state).is_some()
    }

    /// Append `state` under its own modality without a duplicate check.
    pub fn insert(&mut self, state: MentalState) -> Result<MentalStateId, CognitionError> {
        let id = self
            .next_id
            .ok_or(CognitionError::ArenaExhausted { owner: self.owner })?;
        self.next_id = id.next();
        self.order.entry(state.modality).or_default().push(id);
        self.records.insert(id, state);
        Ok(id)
    }

    /// Append `state` unless an equal record is already present.
    ///
    /// Returns `Ok(None)` for a duplicate.
    pub fn add(&mut self, state: MentalState) -> Result<Option<MentalStateId>, CognitionError> {
        if self.contains(state.modality, &state) {
            return Ok(None);
        }
        self.insert(state).map(Some)
    }

    /// Remove the record `id` and purge it from every link list.
    pub fn remove_id(&mut self, id: MentalStateId) -> Option<MentalState> {
        let removed = self.records.remove(&id)?;
        if let Some(ids) = self.order.get_mut(&removed.modality) {
            ids.retain(|held| *held != id);
        }
        self.purge_links(id);
        Some(removed)
    }

    /// Remove the first record of `modality` equal to `state`.
    pub fn remove(&mut self, modality: Modality, state: &MentalState) -> Option<MentalState> {
        let id = self.find(modality, state)?;
        self.remove_id(id)
    }

    /// Remove every record of `modality` satisfying `test`.
    pub fn remove_where(
        &mut self,
        modality: Modality,
        test: impl Fn(&MentalState) -> bool,
    ) -> Vec<MentalState> {
        let doomed: Vec<MentalStateId> = self
            .iter(modality)
            .filter(|(_, state)| test(state))
            .map(|(id, _)| id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.remove_id(id))
            .collect()
    }

    /// Remove every record of `modality`.
    pub fn clear(&mut self, modality: Modality) {
        let ids: Vec<MentalStateId> = self.ids(modality).to_vec();
        for id in ids {
            self.remove_id(id);
        }
    }

    /// Drop `id` from the subintention and on-hold lists of every record.
    fn purge_links(&mut self, id: MentalStateId) {
        for record in self.records.values_mut() {
            record.subintentions.retain(|link| *link != id);
            if let Some(hold) = record.on_hold_until.as_mut() {
                hold.retain(|link| *link != id);
            }
            if record.super_intention == Some(id) {
                record.super_intention = None;
            }
        }
    }

    /// Drop from intention link lists every entry whose record equals `state`.
    ///
    /// The referenced records themselves stay in their stores.
    pub fn unlink_matching(&mut self, state: &MentalState) {
        let matching: Vec<MentalStateId> = self
            .records
            .iter()
            .filter(|(_, record)| record.equals(state))
            .map(|(id, _)| *id)
            .collect();
        if matching.is_empty() {
            return;
        }
        let intentions: Vec<MentalStateId> = self.ids(Modality::Intention).to_vec();
        for id in intentions {
            if let Some(intention) = self.records.get_mut(&id) {
                if intention.predicate().is_none() {
                    continue;
                }
                intention.subintentions.retain(|link| !matching.contains(link));
                if let Some(hold) = intention.on_hold_until.as_mut() {
                    hold.retain(|link| !matching.contains(link));
                }
            }
        }
    }

    /// Decrement every finite positive lifetime in `modality` by one and
    /// return the ids that have reached zero.
    pub fn age(&mut self, modality: Modality) -> Vec<MentalStateId> {
        let ids: Vec<MentalStateId> = self.ids(modality).to_vec();
        let mut expired = Vec::new();
        for id in ids {
            if let Some(record) = self.records.get_mut(&id) {
                if let Some(remaining) = record.lifetime {
                    let remaining = remaining.saturating_sub(1);
                    record.lifetime = Some(remaining);
                    if remaining == 0 {
                        expired.push(id);
                    }
                }
            }
        }
        expired
    }

    /// Clone the records of `modality`, oldest first.
    pub fn snapshot(&self, modality: Modality) -> Vec<MentalState> {
        self.iter(modality).map(|(_, state)| state.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_types::Predicate;

    use super::*;

    fn store() -> MentalStateStore {
        MentalStateStore::new(AgentId::new())
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut store = store();
        let first = store.add(MentalState::belief(Predicate::new("water")));
        assert!(matches!(first, Ok(Some(_))));
        let again = store.add(MentalState::belief(Predicate::new("water")).with_strength(0.3));
        assert!(matches!(again, Ok(None)));
        assert_eq!(store.len(Modality::Belief), 1);
    }

    #[test]
    fn modalities_are_separate() {
        let mut store = store();
        store.add(MentalState::belief(Predicate::new("water"))).unwrap();
        store.add(MentalState::desire(Predicate::new("water"))).unwrap();
        assert_eq!(store.len(Modality::Belief), 1);
        assert_eq!(store.len(Modality::Desire), 1);
        assert!(store.is_empty(Modality::Intention));
    }

    #[test]
    fn remove_purges_links() {
        let mut store = store();
        let sub = store
            .add(MentalState::desire(Predicate::new("food")))
            .unwrap()
            .unwrap();
        let mut intention = MentalState::about(Modality::Intention, Predicate::new("eat"));
        intention.subintentions.push(sub);
        intention.on_hold_until = Some(vec![sub]);
        let intention_id = store.add(intention).unwrap().unwrap();

        assert!(store.remove_id(sub).is_some());
        let intention = store.get(intention_id).unwrap();
        assert!(intention.subintentions.is_empty());
        assert_eq!(intention.on_hold_until.as_deref(), Some(&[][..]));
    }

    #[test]
    fn remove_absent_is_none() {
        let mut store = store();
        let state = MentalState::belief(Predicate::new("water"));
        assert!(store.remove(Modality::Belief, &state).is_none());
        assert!(store.remove(Modality::Belief, &state).is_none());
    }

    #[test]
    fn aging_expires_at_zero_and_spares_infinite() {
        let mut store = store();
        let short = store
            .add(MentalState::belief(Predicate::new("a")).with_lifetime(1))
            .unwrap()
            .unwrap();
        let zero = store
            .add(MentalState::belief(Predicate::new("b")).with_lifetime(0))
            .unwrap()
            .unwrap();
        store.add(MentalState::belief(Predicate::new("c"))).unwrap();

        let expired = store.age(Modality::Belief);
        assert_eq!(expired, vec![short, zero]);
        assert_eq!(store.len(Modality::Belief), 3);
    }

    #[test]
    fn unlink_matching_keeps_records() {
        let mut store = store();
        let sub = store
            .add(MentalState::desire(Predicate::new("food")))
            .unwrap()
            .unwrap();
        let mut intention = MentalState::about(Modality::Intention, Predicate::new("eat"));
        intention.on_hold_until = Some(vec![sub]);
        let intention_id = store.add(intention).unwrap().unwrap();

        store.unlink_matching(&MentalState::belief(Predicate::new("food")));
        assert!(store.holds(Modality::Desire, sub));
        let hold = store.get(intention_id).unwrap().on_hold_until.clone();
        assert_eq!(hold, Some(Vec::new()));
    }

    #[test]
    fn last_tracks_insertion_order() {
        let mut store = store();
        store
            .add(MentalState::about(Modality::Intention, Predicate::new("a")))
            .unwrap();
        let b = store
            .add(MentalState::about(Modality::Intention, Predicate::new("b")))
            .unwrap()
            .unwrap();
        assert_eq!(store.last(Modality::Intention), Some(b));
    }
}
