//! Built-in demonstration library: a small village.
//!
//! Agents get hungry and forage, look for shelter when it rains, chat with
//! the agents they know (catching their good mood), queue on market days
//! because a law obliges them to, and the most conscientious ones patrol
//! the market, scolding those who skip the queue.
//!
//! Perception is driven by the tick number so the run stays reproducible.

use mindset_agents::{Contagion, spread};
use mindset_core::enforcement::{Enforcement, enforce};
use mindset_core::library::{Sanction, behavior};
use mindset_core::{Condition, Law, Library, Norm, Plan, Trigger, TriggerPhase};
use mindset_types::{Emotion, EmotionKind, MentalState, Predicate};

/// Ticks per market cycle.
const MARKET_CYCLE: u64 = 10;
/// Ticks of each market cycle during which the market is open.
const MARKET_HOURS: u64 = 3;
/// Ticks per weather cycle.
const WEATHER_CYCLE: u64 = 7;
/// Dry ticks at the start of each weather cycle.
const DRY_SPELL: u64 = 4;
/// Contagion threshold for chats.
const CHAT_CONTAGION: f64 = 0.25;

/// Goal: eat something.
pub fn eat() -> Predicate {
    Predicate::new("eat")
}

/// Goal: spend time with others.
pub fn socialize() -> Predicate {
    Predicate::new("socialize")
}

/// Goal: watch over the market.
pub fn keep_order() -> Predicate {
    Predicate::new("keep_order")
}

/// Obligation on market days.
pub fn queue() -> Predicate {
    Predicate::new("queue")
}

fn raining() -> Predicate {
    Predicate::new("raining")
}

fn dry() -> Predicate {
    Predicate::new("dry")
}

fn market_open() -> Predicate {
    Predicate::new("market_open")
}

fn belief(predicate: Predicate, lifetime: u32) -> MentalState {
    MentalState::belief(predicate).with_lifetime(lifetime)
}

fn in_window(tick: u64, cycle: u64, from: u64, to: u64) -> bool {
    tick.checked_rem(cycle).is_some_and(|phase| phase >= from && phase < to)
}

/// The village library.
pub fn village() -> Library {
    plans(duties(routines(Library::new())))
}

/// Perception and the rules and coping that follow from it.
fn routines(library: Library) -> Library {
    library
        .trigger(Trigger::new(
            "market_bell",
            TriggerPhase::Perceive,
            behavior(|state, situation| {
                if in_window(situation.tick, MARKET_CYCLE, 0, MARKET_HOURS) {
                    state.add_belief(belief(market_open(), 1));
                }
                Ok(())
            }),
        ))
        .trigger(Trigger::new(
            "weather",
            TriggerPhase::Perceive,
            behavior(|state, situation| {
                if in_window(situation.tick, WEATHER_CYCLE, DRY_SPELL, WEATHER_CYCLE) {
                    state.add_belief(belief(raining(), 1));
                }
                Ok(())
            }),
        ))
        .trigger(
            Trigger::new(
                "hunger",
                TriggerPhase::Rule,
                behavior(|state, _| {
                    state.add_desire(None, MentalState::desire(eat()).with_strength(0.8));
                    Ok(())
                }),
            )
            .when(Condition::All(vec![
                Condition::HasBelief(eat()).negate(),
                Condition::HasDesire(eat()).negate(),
            ])),
        )
        .trigger(
            Trigger::new(
                "loneliness",
                TriggerPhase::Rule,
                behavior(|state, _| {
                    state.add_desire(None, MentalState::desire(socialize()).with_strength(0.4));
                    Ok(())
                }),
            )
            .when(Condition::All(vec![
                Condition::HasBelief(socialize()).negate(),
                Condition::HasDesire(socialize()).negate(),
            ])),
        )
        .trigger(
            Trigger::new(
                "duty",
                TriggerPhase::Rule,
                behavior(|state, _| {
                    state.add_desire(None, MentalState::desire(queue()));
                    Ok(())
                }),
            )
            .when(Condition::All(vec![
                Condition::HasObligation(queue()),
                Condition::HasDesire(queue()).negate(),
            ])),
        )
        .trigger(
            Trigger::new(
                "seek_shelter",
                TriggerPhase::Coping,
                behavior(|state, _| {
                    state.add_desire(None, MentalState::desire(dry()).with_strength(0.9));
                    Ok(())
                }),
            )
            .when(Condition::All(vec![
                Condition::HasBelief(raining()),
                Condition::HasBelief(dry()).negate(),
            ])),
        )
}

/// The market law, the norm answering it and the enforcers' verdicts.
fn duties(library: Library) -> Library {
    library
        .law(
            Law::new("market_day", queue())
                .given(market_open())
                .with_lifetime(3)
                .with_threshold(0.4),
        )
        .norm(
            Norm::new(
                "queue_politely",
                behavior(|state, _| {
                    state.add_belief(belief(queue(), 2));
                    Ok(())
                }),
            )
            .answering(queue())
            .with_threshold(0.3)
            .with_lifetime(2),
        )
        .sanction(Sanction::new(
            "scold",
            behavior(|state, _| {
                state.add_emotion(Emotion::new(EmotionKind::Reproach).with_intensity(0.4).with_decay(0.1));
                Ok(())
            }),
        ))
        .sanction(Sanction::new(
            "thank",
            behavior(|state, _| {
                state.add_emotion(Emotion::new(EmotionKind::Admiration).with_intensity(0.3).with_decay(0.1));
                Ok(())
            }),
        ))
}

fn plans(library: Library) -> Library {
    library
        .plan(
            Plan::new(
                "forage",
                behavior(|state, _| {
                    state.add_belief(belief(eat(), 3));
                    Ok(())
                }),
            )
            .for_intention(eat()),
        )
        .plan(
            Plan::new(
                "shelter",
                behavior(|state, _| {
                    state.add_belief(belief(dry(), 2));
                    Ok(())
                }),
            )
            .for_intention(dry())
            .when(Condition::HasBelief(raining())),
        )
        .plan(
            Plan::new(
                "chat",
                behavior(|state, situation| {
                    let good_mood = Contagion::of(Emotion::new(EmotionKind::Joy).about(eat()))
                        .with_threshold(CHAT_CONTAGION);
                    let partners: Vec<_> = state.social_links().map(|link| link.agent).collect();
                    for partner in partners {
                        if let Some(snapshot) = situation.population.get(&partner) {
                            spread(state, snapshot, &good_mood, CHAT_CONTAGION);
                        }
                    }
                    state.add_belief(belief(socialize(), 5));
                    Ok(())
                }),
            )
            .for_intention(socialize()),
        )
        .plan(
            Plan::new(
                "patrol",
                behavior(|state, situation| {
                    let request = Enforcement::obligation(queue())
                        .sanction("scold")
                        .reward("thank");
                    let owner = state.owner();
                    let population = situation.population;
                    for target in population.values().filter(|s| s.agent != owner) {
                        enforce(state, target, &request, situation)?;
                    }
                    Ok(())
                }),
            )
            .for_intention(keep_order())
            .when(Condition::HasBelief(market_open())),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_agents::{
        AgentSnapshot, CognitionTunables, CognitiveState, EngineConfig, SnapshotMap,
    };
    use mindset_core::{RngSource, TickContext, run_tick};
    use mindset_types::AgentId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn agent() -> CognitiveState {
        let config = EngineConfig {
            use_personality: true,
            use_emotion_architecture: true,
            use_social_architecture: true,
            ..EngineConfig::default()
        };
        CognitiveState::new(AgentId::new(), config, &CognitionTunables::default())
    }

    fn run(state: &mut CognitiveState, library: &Library, population: &SnapshotMap, tick: u64) {
        let tunables = CognitionTunables::default();
        let context = TickContext {
            tick,
            library,
            population,
            tunables: &tunables,
        };
        let mut rng = RngSource::new(SmallRng::seed_from_u64(tick));
        run_tick(state, &context, &mut rng).unwrap();
    }

    #[test]
    fn windows_follow_the_cycle() {
        assert!(in_window(0, MARKET_CYCLE, 0, MARKET_HOURS));
        assert!(in_window(12, MARKET_CYCLE, 0, MARKET_HOURS));
        assert!(!in_window(5, MARKET_CYCLE, 0, MARKET_HOURS));
        assert!(in_window(5, WEATHER_CYCLE, DRY_SPELL, WEATHER_CYCLE));
        assert!(!in_window(5, 0, 0, 1));
    }

    #[test]
    fn hungry_agent_forages() {
        let library = village();
        let mut state = agent();
        state.add_desire(None, MentalState::desire(eat()).with_strength(1.0));
        run(&mut state, &library, &SnapshotMap::new(), 5);
        assert!(state.has_belief(&MentalState::belief(eat())));
        assert!(!state.has_desire(&MentalState::desire(eat())));
    }

    #[test]
    fn market_day_imposes_the_queue() {
        let library = village();
        let mut state = agent();
        run(&mut state, &library, &SnapshotMap::new(), 10);
        let obliged = state.has_obligation(&MentalState::obligation(queue()));
        let queued = state.has_belief(&MentalState::belief(queue()));
        assert!(obliged || queued);
    }

    #[test]
    fn patrol_scolds_whoever_skips_the_queue() {
        let library = village();
        let mut skipper = agent();
        skipper.add_obligation(MentalState::obligation(queue()));
        let population: SnapshotMap =
            [(skipper.owner(), AgentSnapshot::of(&skipper))].into_iter().collect();

        let mut warden = agent();
        warden.add_desire(None, MentalState::desire(keep_order()).with_strength(1.0));
        // Too disobedient for the market law, so nothing preempts the patrol.
        warden.personality.conscientiousness = 0.0;
        warden.personality.agreeableness = 0.0;
        run(&mut warden, &library, &population, 1);

        assert!(warden.has_emotion(&Emotion::new(EmotionKind::Reproach)));
    }
}
