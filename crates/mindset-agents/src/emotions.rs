//! The emotion base of one agent.

use mindset_types::{AgentId, Emotion, EmotionKind, Predicate};

/// Ordered set of emotions, unique by kind, `about` and cause.
#[derive(Debug, Clone, Default)]
pub struct EmotionBase {
    emotions: Vec<Emotion>,
}

impl EmotionBase {
    /// Create an empty base.
    pub const fn new() -> Self {
        Self {
            emotions: Vec::new(),
        }
    }

    /// Store `emotion` on behalf of `owner`.
    ///
    /// An existing emotion with the same identity is replaced. When both
    /// carry an intensity they merge: the intensities add up to at most 1
    /// and the decay of the stronger one is kept (the older one on ties).
    pub fn add(&mut self, owner: AgentId, mut emotion: Emotion) {
        if let Some(position) = self.position(&emotion) {
            let old = self.emotions.remove(position);
            if let (Some(new_intensity), Some(old_intensity)) = (emotion.intensity, old.intensity) {
                emotion.intensity = Some((new_intensity + old_intensity).min(1.0));
                if old_intensity >= new_intensity {
                    emotion.decay = old.decay;
                }
            }
        }
        emotion.owner = Some(owner);
        self.emotions.push(emotion);
    }

    /// Remove the emotion with the same identity. Returns whether one existed.
    pub fn remove(&mut self, emotion: &Emotion) -> bool {
        match self.position(emotion) {
            Some(position) => {
                self.emotions.remove(position);
                true
            }
            None => false,
        }
    }

    /// True if an emotion with the same identity is stored.
    pub fn contains(&self, emotion: &Emotion) -> bool {
        self.position(emotion).is_some()
    }

    /// The stored emotion with the same identity.
    pub fn get(&self, emotion: &Emotion) -> Option<&Emotion> {
        self.emotions.iter().find(|held| held.same_as(emotion))
    }

    /// First stored emotion of `kind`, whatever its payload.
    pub fn first_of_kind(&self, kind: &EmotionKind) -> Option<&Emotion> {
        self.emotions.iter().find(|held| held.kind == *kind)
    }

    /// All stored emotions of `kind`.
    pub fn of_kind<'a, 'k>(&'a self, kind: &'k EmotionKind) -> impl Iterator<Item = &'a Emotion> + use<'a, 'k> {
        self.emotions.iter().filter(move |held| held.kind == *kind)
    }

    /// First stored emotion of `kind` about a predicate matching `about`.
    pub fn find_about(&self, kind: &EmotionKind, about: &Predicate) -> Option<&Emotion> {
        self.of_kind(kind).find(|held| held.is_about(about))
    }

    /// All stored emotions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Emotion> {
        self.emotions.iter()
    }

    /// Number of stored emotions.
    pub fn len(&self) -> usize {
        self.emotions.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
    }

    /// Apply one tick of decay and evict emotions whose tracked intensity
    /// reached zero. Returns the evicted emotions.
    pub fn decay(&mut self) -> Vec<Emotion> {
        for emotion in &mut self.emotions {
            if let Some(intensity) = emotion.intensity.as_mut() {
                *intensity -= emotion.decay;
            }
        }
        let (faded, kept): (Vec<Emotion>, Vec<Emotion>) = self
            .emotions
            .drain(..)
            .partition(|emotion| emotion.intensity.is_some_and(|i| i <= 0.0));
        self.emotions = kept;
        faded
    }

    fn position(&self, emotion: &Emotion) -> Option<usize> {
        self.emotions.iter().position(|held| held.same_as(emotion))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn joy(intensity: f64) -> Emotion {
        Emotion::new(EmotionKind::Joy)
            .with_intensity(intensity)
            .about(Predicate::new("water"))
    }

    #[test]
    fn merge_adds_and_caps_intensity() {
        let owner = AgentId::new();
        let mut base = EmotionBase::new();
        base.add(owner, joy(0.4));
        base.add(owner, joy(0.3));
        assert_eq!(base.len(), 1);
        let stored = base.get(&joy(0.0)).unwrap();
        assert!((stored.intensity.unwrap() - 0.7).abs() < 1e-9);

        base.add(owner, joy(0.9));
        let stored = base.get(&joy(0.0)).unwrap();
        assert!((stored.intensity.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(stored.owner, Some(owner));
    }

    #[test]
    fn merge_keeps_decay_of_stronger() {
        let owner = AgentId::new();
        let mut base = EmotionBase::new();
        base.add(owner, joy(0.6).with_decay(0.01));
        base.add(owner, joy(0.2).with_decay(0.5));
        assert!((base.get(&joy(0.0)).unwrap().decay - 0.01).abs() < 1e-9);

        base.add(owner, joy(0.9).with_decay(0.2));
        assert!((base.get(&joy(0.0)).unwrap().decay - 0.2).abs() < 1e-9);
    }

    #[test]
    fn untracked_replaces_without_merge() {
        let owner = AgentId::new();
        let mut base = EmotionBase::new();
        base.add(owner, joy(0.4));
        base.add(owner, Emotion::new(EmotionKind::Joy).about(Predicate::new("water")));
        assert_eq!(base.len(), 1);
        assert!(base.get(&joy(0.0)).unwrap().intensity.is_none());
    }

    #[test]
    fn decay_evicts_faded_but_keeps_untracked() {
        let owner = AgentId::new();
        let mut base = EmotionBase::new();
        base.add(owner, joy(0.1).with_decay(0.1));
        base.add(owner, Emotion::new(EmotionKind::Fear).with_decay(0.5));
        base.add(
            owner,
            Emotion::new(EmotionKind::Hope)
                .with_intensity(0.8)
                .with_decay(0.3),
        );
        let faded = base.decay();
        assert_eq!(faded.len(), 1);
        assert_eq!(base.len(), 2);
        let hope = base.first_of_kind(&EmotionKind::Hope).unwrap();
        assert!((hope.intensity.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn remove_reports_presence() {
        let owner = AgentId::new();
        let mut base = EmotionBase::new();
        base.add(owner, joy(0.5));
        assert!(base.remove(&joy(0.0)));
        assert!(!base.remove(&joy(0.0)));
        assert!(base.is_empty());
    }
}
