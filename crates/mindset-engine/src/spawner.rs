//! Population spawner for seeding the simulation with initial agents.
//!
//! At simulation start, the spawner creates N agents with random OCEAN
//! personalities and a few starting desires, then links random ordered
//! pairs of agents with random social link values.

use mindset_agents::CognitiveState;
use mindset_core::Population;
use mindset_core::config::SimulationConfig;
use mindset_types::{AgentId, MentalState, Personality, SocialLink};
use rand::Rng;
use tracing::{debug, info};

use crate::scenario;

/// Conscientiousness above which an agent wants to keep order.
const WARDEN_CONSCIENTIOUSNESS: f64 = 0.6;

/// Spawn the initial population described by `config`.
///
/// Agent ids are fresh UUIDs; personalities, desire strengths and links
/// come from `rng`.
pub fn spawn_population(config: &SimulationConfig, rng: &mut impl Rng) -> Population {
    let mut population =
        Population::new(config.world.seed, config.population.parallel_threshold);

    let mut ids = Vec::new();
    for _ in 0..config.population.initial_agents {
        let personality = random_personality(rng);
        let mut state = CognitiveState::new(AgentId::new(), config.engine, &config.tunables)
            .with_personality(personality);
        seed_desires(&mut state, rng);
        debug!(
            agent_id = %state.owner(),
            openness = personality.openness,
            conscientiousness = personality.conscientiousness,
            extraversion = personality.extraversion,
            agreeableness = personality.agreeableness,
            neuroticism = personality.neuroticism,
            "Spawned agent"
        );
        ids.push(population.insert(state));
    }

    let links = link_agents(&mut population, &ids, config.population.link_probability, rng);
    info!(agents = population.len(), links, "Population spawned");
    population
}

/// Draw every trait uniformly from `[0, 1]`.
fn random_personality(rng: &mut impl Rng) -> Personality {
    Personality::new(
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    )
}

fn seed_desires(state: &mut CognitiveState, rng: &mut impl Rng) {
    state.add_desire(
        None,
        MentalState::desire(scenario::eat()).with_strength(rng.random_range(0.5..=1.0)),
    );
    state.add_desire(
        None,
        MentalState::desire(scenario::socialize()).with_strength(rng.random_range(0.2..=0.6)),
    );
    if state.personality.conscientiousness > WARDEN_CONSCIENTIOUSNESS {
        state.add_desire(
            None,
            MentalState::desire(scenario::keep_order()).with_strength(0.5),
        );
    }
}

/// Link each ordered pair with probability `probability`. Returns the
/// number of links created.
fn link_agents(
    population: &mut Population,
    ids: &[AgentId],
    probability: f64,
    rng: &mut impl Rng,
) -> usize {
    let probability = probability.clamp(0.0, 1.0);
    let mut created = 0_usize;
    for from in ids {
        for to in ids.iter().filter(|to| *to != from) {
            if !rng.random_bool(probability) {
                continue;
            }
            let link = SocialLink::new(*to)
                .with_liking(rng.random_range(-1.0..=1.0))
                .with_dominance(rng.random_range(-1.0..=1.0))
                .with_solidarity(rng.random_range(0.0..=1.0))
                .with_familiarity(rng.random_range(0.0..=1.0))
                .with_trust(rng.random_range(-1.0..=1.0));
            if let Some(state) = population.get_mut(from) {
                if state.add_social_link(link) {
                    created = created.saturating_add(1);
                }
            }
        }
    }
    created
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
