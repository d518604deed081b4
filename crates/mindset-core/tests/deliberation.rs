//! Whole-tick behaviour of the deliberation cycle.
//!
//! These tests drive agents through [`run_tick`] and [`Population::step`]
//! and check the store invariants and the reference scenarios end to end.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use mindset_agents::{AgentSnapshot, CognitionTunables, CognitiveState, EngineConfig, SnapshotMap};
use mindset_core::collaborator::RngSource;
use mindset_core::library::{Plan, idle};
use mindset_core::{Condition, Library, Population, TickContext, run_tick};
use mindset_types::{AgentId, Emotion, EmotionKind, MentalState, Modality, Predicate, SocialLink};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const EPSILON: f64 = 1e-9;

fn agent(config: EngineConfig) -> CognitiveState {
    CognitiveState::new(AgentId::new(), config, &CognitionTunables::default())
}

fn emotional() -> EngineConfig {
    EngineConfig {
        use_emotion_architecture: true,
        ..EngineConfig::default()
    }
}

fn tick(state: &mut CognitiveState, library: &Library, population: &SnapshotMap, seed: u64) {
    let tunables = CognitionTunables::default();
    let context = TickContext {
        tick: 1,
        library,
        population,
        tunables: &tunables,
    };
    let mut rng = RngSource::new(SmallRng::seed_from_u64(seed));
    run_tick(state, &context, &mut rng).unwrap();
}

fn errand_library() -> Library {
    ["eat", "sleep", "work", "play"]
        .into_iter()
        .fold(Library::new(), |library, name| {
            library.plan(
                Plan::new(name, idle())
                    .for_intention(Predicate::new(name))
                    .finished_when(Condition::Never),
            )
        })
}

// =============================================================================
// Store invariants
// =============================================================================

#[tokio::test]
async fn intentions_never_hold_equal_predicates() {
    let config = EngineConfig {
        use_probabilistic_choice: true,
        use_persistence: true,
        ..EngineConfig::default()
    };
    let mut population = Population::new(11, 4);
    for _ in 0..8 {
        let mut state = agent(config);
        state.dispositions.intention_persistence = 0.6;
        state.dispositions.plan_persistence = 0.4;
        for (name, strength) in [("eat", 0.5), ("sleep", 0.2), ("work", 0.9), ("play", 0.4)] {
            state.add_desire(None, MentalState::desire(Predicate::new(name)).with_strength(strength));
        }
        population.insert(state);
    }
    let library = Arc::new(errand_library());
    let tunables = Arc::new(CognitionTunables::default());

    for tick in 1..=30 {
        population.step(tick, 1.0, &library, &tunables).await.unwrap();
        for state in population.iter() {
            let intentions: Vec<&MentalState> = state.mental_states(Modality::Intention).collect();
            for (i, a) in intentions.iter().enumerate() {
                for b in intentions.iter().skip(i + 1) {
                    let (pa, pb) = (a.predicate().unwrap(), b.predicate().unwrap());
                    assert!(!pa.equals(pb), "duplicate intention {pa} at tick {tick}");
                }
            }
        }
    }
}

#[test]
fn obligation_empties_intentions_and_plan() {
    let mut state = agent(EngineConfig::default());
    state.add_intention(MentalState::desire(Predicate::new("goHome")));
    state.current_plan = Some("walk_home".to_owned());

    assert!(state.add_obligation(MentalState::obligation(Predicate::new("report"))));
    assert!(state.store().is_empty(Modality::Intention));
    assert!(state.current_plan.is_none());
}

#[test]
fn removing_an_absent_state_twice_changes_nothing() {
    let mut state = agent(EngineConfig::default());
    state.add_desire(None, MentalState::desire(Predicate::new("rest")));
    state.add_belief(MentalState::belief(Predicate::new("tired")));
    let ghost = MentalState::belief(Predicate::new("ghost"));

    assert!(!state.remove_belief(&ghost));
    assert!(!state.remove_belief(&ghost));
    assert_eq!(state.store().len(Modality::Belief), 1);
    assert_eq!(state.store().len(Modality::Desire), 1);
}

#[test]
fn belief_add_then_remove_restores_the_store() {
    let mut state = agent(EngineConfig::default());
    state.add_belief(MentalState::belief(Predicate::new("sky").with_value("color", "blue")));
    let before: Vec<String> = state.mental_states(Modality::Belief).map(ToString::to_string).collect();

    let rain = MentalState::belief(Predicate::new("rain"));
    assert!(state.add_belief(rain.clone()));
    assert!(state.remove_belief(&rain));

    let after: Vec<String> = state.mental_states(Modality::Belief).map(ToString::to_string).collect();
    assert_eq!(before, after);
}

#[test]
fn lifetimes_bound_eviction() {
    let mut state = agent(EngineConfig::default());
    state.add_belief(MentalState::belief(Predicate::new("flash")).with_lifetime(0));
    state.add_belief(MentalState::belief(Predicate::new("sun")));
    state.add_belief(MentalState::belief(Predicate::new("cloud")).with_lifetime(2));
    let library = Library::new();
    let population = SnapshotMap::new();

    tick(&mut state, &library, &population, 1);
    assert!(!state.has_belief(&MentalState::belief(Predicate::new("flash"))));
    assert!(state.has_belief(&MentalState::belief(Predicate::new("cloud"))));

    for seed in 2..20 {
        tick(&mut state, &library, &population, seed);
    }
    assert!(!state.has_belief(&MentalState::belief(Predicate::new("cloud"))));
    assert!(state.has_belief(&MentalState::belief(Predicate::new("sun"))));
}

// =============================================================================
// Emotions
// =============================================================================

#[test]
fn equal_emotions_merge_up_to_one() {
    let mut state = agent(EngineConfig::default());
    let about = Predicate::new("gift");
    let cause = AgentId::new();
    let joy = |intensity| {
        Emotion::new(EmotionKind::Joy)
            .about(about.clone())
            .caused_by(cause)
            .with_intensity(intensity)
    };

    state.add_emotion(joy(0.2));
    state.add_emotion(joy(0.3));
    assert_eq!(state.emotions().len(), 1);
    let merged = state.emotions().iter().next().unwrap();
    assert!((merged.intensity.unwrap() - 0.5).abs() < EPSILON);

    state.add_emotion(joy(0.9));
    assert_eq!(state.emotions().len(), 1);
    let capped = state.emotions().iter().next().unwrap();
    assert!((capped.intensity.unwrap() - 1.0).abs() < EPSILON);
}

#[test]
fn believing_a_desire_brings_joy() {
    let mut state = agent(emotional());
    let water = Predicate::new("water");
    state.add_desire(None, MentalState::desire(water.clone()).with_strength(1.0));

    state.add_belief(MentalState::belief(water.clone()));

    let joys: Vec<&Emotion> = state.emotions().of_kind(&EmotionKind::Joy).collect();
    assert_eq!(joys.len(), 1);
    let joy = joys[0];
    assert!((joy.intensity.unwrap() - 1.0).abs() < EPSILON);
    assert!(joy.decay.abs() < EPSILON);
    assert!(joy.about.as_ref().unwrap().equals(&water));
}

#[test]
fn partner_joy_makes_a_liking_agent_happy_for_them() {
    let config = EngineConfig {
        use_emotion_architecture: true,
        use_social_architecture: true,
        ..EngineConfig::default()
    };
    let mut me = agent(config);
    let mut friend = agent(config);
    let party = Predicate::new("party");
    friend.add_emotion(
        Emotion::new(EmotionKind::Joy)
            .about(party.clone())
            .with_intensity(0.8),
    );
    me.add_social_link(SocialLink::new(friend.owner()).with_liking(0.5));

    let population: SnapshotMap = [(friend.owner(), AgentSnapshot::of(&friend))].into_iter().collect();
    tick(&mut me, &Library::new(), &population, 5);

    let happy = me
        .emotions()
        .of_kind(&EmotionKind::HappyFor)
        .find(|e| e.is_about(&party))
        .unwrap();
    assert_eq!(happy.agent_cause, Some(friend.owner()));
    assert!(happy.intensity.unwrap() > 0.0);
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn strongest_desire_wins_deterministic_selection() {
    let low = Predicate::new("nap");
    let high = Predicate::new("feast");
    let library = Library::new()
        .plan(Plan::new("nap", idle()).for_intention(low.clone()))
        .plan(Plan::new("feast", idle()).for_intention(high.clone()));
    let population = SnapshotMap::new();

    for seed in 0..20 {
        let mut state = agent(EngineConfig::default());
        state.add_desire(None, MentalState::desire(low.clone()).with_strength(0.3));
        state.add_desire(None, MentalState::desire(high.clone()).with_strength(0.9));

        tick(&mut state, &library, &population, seed);

        let current = state.current_intention().unwrap();
        assert!(current.predicate().unwrap().equals(&high), "seed {seed}");
        assert_eq!(state.current_plan.as_deref(), Some("feast"));
    }
}

#[test]
fn subgoals_are_pursued_before_their_intention() {
    let mut trip = Predicate::new("trip");
    trip.subgoals = vec![Predicate::new("pack"), Predicate::new("book")];
    let library = Library::new()
        .plan(Plan::new("travel", idle()).for_intention(Predicate::new("trip")))
        .plan(Plan::new("pack", idle()).for_intention(Predicate::new("pack")))
        .plan(Plan::new("book", idle()).for_intention(Predicate::new("book")));
    let population = SnapshotMap::new();
    let mut state = agent(EngineConfig::default());
    state.add_desire(None, MentalState::desire(trip).with_strength(0.9));

    tick(&mut state, &library, &population, 3);
    // First tick: the trip becomes an intention waiting on its sub-goals.
    tick(&mut state, &library, &population, 4);

    let current = state.current_intention().unwrap().predicate().unwrap().name.clone();
    assert!(current == "pack" || current == "book", "current intention {current}");
    assert!(state.store().len(Modality::Intention) >= 2);
}
