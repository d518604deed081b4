//! The agent population and its per-tick fan-out.
//!
//! A [`Population`] owns every agent's [`CognitiveState`]. Each
//! [`Population::step`] takes read-only snapshots of all agents first, then
//! ticks every agent against those snapshots, either on the calling task or
//! across `spawn_blocking` workers once the population is large enough.
//! Every agent draws from its own RNG derived from the run seed, its id
//! and the tick, so both paths produce the same result.

use std::collections::BTreeMap;
use std::sync::Arc;

use mindset_agents::{AgentSnapshot, CognitionTunables, CognitiveState, SnapshotMap};
use mindset_types::AgentId;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::collaborator::RngSource;
use crate::library::{Library, SanctionMark};
use crate::runner::RunnerError;
use crate::tick::{ExecutionResult, TickContext, TickError, run_tick};

/// Golden-ratio increment used to spread tick numbers across seeds.
const TICK_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// An agent whose tick was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFailure {
    /// The agent.
    pub agent: AgentId,
    /// Rendered [`TickError`].
    pub reason: String,
}

/// Outcome of one population tick.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: u64,
    /// Agents in the population during the tick.
    pub agents: usize,
    /// Per-agent results of completed ticks, ordered by agent id.
    pub results: Vec<ExecutionResult>,
    /// Agents whose tick was aborted by a collaborator failure.
    pub failures: Vec<AgentFailure>,
    /// Sanction marks applied to their targets.
    pub sanctions: usize,
}

impl TickSummary {
    /// Agents that finished the tick with an intention.
    pub fn intending(&self) -> usize {
        self.results.iter().filter(|r| r.intention.is_some()).count()
    }

    /// Plans and norms executed across the population.
    pub fn dispatched(&self) -> usize {
        self.results.iter().map(|r| r.dispatched.len()).sum()
    }
}

type Outcome = (AgentId, Result<ExecutionResult, TickError>);

/// Every agent in the simulation.
#[derive(Debug, Clone)]
pub struct Population {
    agents: BTreeMap<AgentId, CognitiveState>,
    seed: u64,
    parallel_threshold: usize,
}

impl Population {
    /// Create an empty population.
    ///
    /// Ticks run in parallel once the population has at least
    /// `parallel_threshold` agents.
    pub const fn new(seed: u64, parallel_threshold: usize) -> Self {
        Self {
            agents: BTreeMap::new(),
            seed,
            parallel_threshold,
        }
    }

    /// Add an agent, replacing any agent with the same id. Returns its id.
    pub fn insert(&mut self, state: CognitiveState) -> AgentId {
        let id = state.owner();
        self.agents.insert(id, state);
        id
    }

    /// Remove an agent. Its partners drop their links on the next tick.
    pub fn remove(&mut self, agent: &AgentId) -> Option<CognitiveState> {
        self.agents.remove(agent)
    }

    /// Look up an agent.
    pub fn get(&self, agent: &AgentId) -> Option<&CognitiveState> {
        self.agents.get(agent)
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, agent: &AgentId) -> Option<&mut CognitiveState> {
        self.agents.get_mut(agent)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CognitiveState> {
        self.agents.values()
    }

    /// Agent ids in order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> {
        self.agents.keys().copied()
    }

    /// Read-only copies of every agent, keyed by id.
    pub fn snapshots(&self) -> SnapshotMap {
        self.agents
            .iter()
            .map(|(id, state)| (*id, AgentSnapshot::of(state)))
            .collect()
    }

    /// Tick every agent once.
    ///
    /// A collaborator failure aborts only that agent's tick and is reported
    /// in [`TickSummary::failures`]. Sanction marks produced by enforcers
    /// are applied to their targets after every agent has ticked.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Join`] if a worker task panicked. Agents whose
    /// workers completed are kept.
    pub async fn step(
        &mut self,
        tick: u64,
        time_step: f64,
        library: &Arc<Library>,
        tunables: &Arc<CognitionTunables>,
    ) -> Result<TickSummary, RunnerError> {
        let snapshots = Arc::new(self.snapshots());
        for state in self.agents.values_mut() {
            state.time_step = time_step;
        }

        let outcomes = if self.agents.len() >= self.parallel_threshold {
            self.step_parallel(tick, &snapshots, library, tunables).await?
        } else {
            self.step_sequential(tick, &snapshots, library, tunables)
        };

        let mut summary = TickSummary {
            tick,
            agents: self.agents.len(),
            results: Vec::with_capacity(outcomes.len()),
            failures: Vec::new(),
            sanctions: 0,
        };
        for (agent, outcome) in outcomes {
            match outcome {
                Ok(result) => summary.results.push(result),
                Err(error) => {
                    warn!(agent_id = %agent, tick, error = %error, "agent tick aborted");
                    summary.failures.push(AgentFailure {
                        agent,
                        reason: error.to_string(),
                    });
                }
            }
        }
        summary.sanctions = self.apply_marks(summary.results.iter().flat_map(|r| &r.marks));

        info!(
            tick,
            agents = summary.agents,
            intending = summary.intending(),
            dispatched = summary.dispatched(),
            failures = summary.failures.len(),
            sanctions = summary.sanctions,
            "tick complete"
        );
        Ok(summary)
    }

    fn step_sequential(
        &mut self,
        tick: u64,
        snapshots: &SnapshotMap,
        library: &Library,
        tunables: &CognitionTunables,
    ) -> Vec<Outcome> {
        let seed = self.seed;
        let context = TickContext {
            tick,
            library,
            population: snapshots,
            tunables,
        };
        self.agents
            .iter_mut()
            .map(|(agent, state)| (*agent, tick_agent(state, &context, seed)))
            .collect()
    }

    async fn step_parallel(
        &mut self,
        tick: u64,
        snapshots: &Arc<SnapshotMap>,
        library: &Arc<Library>,
        tunables: &Arc<CognitionTunables>,
    ) -> Result<Vec<Outcome>, RunnerError> {
        let seed = self.seed;
        let mut workers = JoinSet::new();
        for (agent, mut state) in std::mem::take(&mut self.agents) {
            let snapshots = Arc::clone(snapshots);
            let library = Arc::clone(library);
            let tunables = Arc::clone(tunables);
            workers.spawn_blocking(move || {
                let context = TickContext {
                    tick,
                    library: library.as_ref(),
                    population: snapshots.as_ref(),
                    tunables: tunables.as_ref(),
                };
                let outcome = tick_agent(&mut state, &context, seed);
                (agent, state, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(workers.len());
        let mut panicked = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((agent, state, outcome)) => {
                    self.agents.insert(agent, state);
                    outcomes.push((agent, outcome));
                }
                Err(source) => {
                    panicked.get_or_insert(source);
                }
            }
        }
        if let Some(source) = panicked {
            return Err(RunnerError::Join { source });
        }
        outcomes.sort_by_key(|(agent, _)| *agent);
        Ok(outcomes)
    }

    fn apply_marks<'m>(&mut self, marks: impl Iterator<Item = &'m SanctionMark>) -> usize {
        let mut applied = 0_usize;
        for mark in marks {
            if let Some(target) = self.agents.get_mut(&mark.target) {
                target.norms.entry(&mark.norm).sanctioned = true;
                applied = applied.saturating_add(1);
            }
        }
        applied
    }
}

fn tick_agent(
    state: &mut CognitiveState,
    context: &TickContext<'_>,
    seed: u64,
) -> Result<ExecutionResult, TickError> {
    let mut rng = RngSource::new(SmallRng::seed_from_u64(agent_seed(
        seed,
        state.owner(),
        context.tick,
    )));
    run_tick(state, context, &mut rng)
}

/// Seed for one agent's draws on one tick.
fn agent_seed(seed: u64, agent: AgentId, tick: u64) -> u64 {
    let (high, low) = agent.into_inner().as_u64_pair();
    seed ^ high ^ low.rotate_left(29) ^ tick.wrapping_mul(TICK_MIX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_agents::EngineConfig;
    use mindset_types::{MentalState, Modality, Predicate};

    use super::*;
    use crate::library::{Plan, behavior, idle};

    fn agent() -> CognitiveState {
        let config = EngineConfig {
            use_probabilistic_choice: true,
            ..EngineConfig::default()
        };
        let mut state = CognitiveState::new(AgentId::new(), config, &CognitionTunables::default());
        for (name, strength) in [("eat", 0.4), ("sleep", 0.7), ("play", 0.2)] {
            state.add_desire(None, MentalState::desire(Predicate::new(name)).with_strength(strength));
        }
        state
    }

    fn library() -> Arc<Library> {
        Arc::new(
            Library::new()
                .plan(Plan::new("eat", idle()).for_intention(Predicate::new("eat")))
                .plan(Plan::new("sleep", idle()).for_intention(Predicate::new("sleep")))
                .plan(Plan::new("play", idle()).for_intention(Predicate::new("play"))),
        )
    }

    fn intentions(population: &Population) -> Vec<Vec<String>> {
        population
            .iter()
            .map(|state| {
                state
                    .mental_states(Modality::Intention)
                    .map(ToString::to_string)
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn parallel_and_sequential_agree() {
        let agents: Vec<CognitiveState> = (0..6).map(|_| agent()).collect();
        let mut sequential = Population::new(7, usize::MAX);
        let mut parallel = Population::new(7, 0);
        for state in agents {
            sequential.insert(state.clone());
            parallel.insert(state);
        }
        let library = library();
        let tunables = Arc::new(CognitionTunables::default());
        for tick in 1..=5 {
            sequential.step(tick, 1.0, &library, &tunables).await.unwrap();
            parallel.step(tick, 1.0, &library, &tunables).await.unwrap();
        }
        assert_eq!(intentions(&sequential), intentions(&parallel));
        assert_eq!(parallel.len(), 6);
    }

    #[tokio::test]
    async fn failing_agent_does_not_stop_the_tick() {
        let mut population = Population::new(1, usize::MAX);
        population.insert(agent());
        let broken = population.insert(agent());
        population
            .get_mut(&broken)
            .unwrap()
            .add_desire(None, MentalState::desire(Predicate::new("explode")).with_strength(9.0));
        let library = Arc::new(
            Library::new().plan(
                Plan::new(
                    "explode",
                    behavior(|_, _| Err(crate::collaborator::GuardError::failed("explode", "boom"))),
                )
                .for_intention(Predicate::new("explode")),
            ),
        );
        let summary = population
            .step(1, 1.0, &library, &Arc::new(CognitionTunables::default()))
            .await
            .unwrap();
        assert_eq!(summary.agents, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures.first().unwrap().agent, broken);
        assert_eq!(summary.results.len(), 1);
    }

    #[tokio::test]
    async fn sanction_marks_reach_their_target() {
        let mut population = Population::new(3, usize::MAX);
        let target = population.insert(agent());
        let mut enforcer = agent();
        enforcer.add_desire(None, MentalState::desire(Predicate::new("police")).with_strength(9.0));
        population.insert(enforcer);
        let library = Arc::new(
            Library::new().plan(
                Plan::new(
                    "police",
                    behavior(move |_, situation| {
                        situation.marks.push(SanctionMark {
                            target,
                            norm: "queue".to_owned(),
                        });
                        Ok(())
                    }),
                )
                .for_intention(Predicate::new("police")),
            ),
        );
        let summary = population
            .step(1, 1.0, &library, &Arc::new(CognitionTunables::default()))
            .await
            .unwrap();
        assert_eq!(summary.sanctions, 1);
        assert!(population.get(&target).unwrap().norms.get("queue").unwrap().sanctioned);
    }

    #[test]
    fn agent_seeds_differ_per_tick_and_agent() {
        let a = AgentId::new();
        let b = AgentId::new();
        assert_ne!(agent_seed(1, a, 1), agent_seed(1, a, 2));
        assert_ne!(agent_seed(1, a, 1), agent_seed(1, b, 1));
    }
}
