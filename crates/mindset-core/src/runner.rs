//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives population ticks until a termination condition is met:
//!
//! - **Bounded simulation**: stop after `max_ticks` (0 means unbounded)
//! - **Empty population**: stop once no agent is left
//! - **Tick pacing**: optional real-time wait between ticks
//!
//! The runner wraps [`Simulation::step`] and reports every completed tick
//! to a [`TickCallback`].

use std::sync::Arc;
use std::time::Duration;

use mindset_agents::CognitionTunables;
use tracing::info;

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::library::Library;
use crate::population::{Population, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock could not be created or advanced.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A worker running agent ticks panicked or was cancelled.
    #[error("agent worker failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Why the simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// No agents remain.
    EmptyPopulation,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to inspect or edit the population between
/// ticks, e.g. to add perceptions or remove departed agents.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, population: &mut Population);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _population: &mut Population) {}
}

/// Everything a run needs: agents, behaviour, tunables and time.
#[derive(Debug)]
pub struct Simulation {
    /// The agents.
    pub population: Population,
    /// Shared behaviour library.
    pub library: Arc<Library>,
    /// Shared numeric knobs.
    pub tunables: Arc<CognitionTunables>,
    /// Tick counter and time step.
    pub clock: SimulationClock,
    /// Stop after this many ticks (0 = unbounded).
    pub max_ticks: u64,
    /// Real-time wait between ticks.
    pub tick_interval: Duration,
}

impl Simulation {
    /// Assemble a simulation from configuration, a population and a library.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Clock`] if the time step is unusable.
    pub fn new(
        config: &SimulationConfig,
        population: Population,
        library: Library,
    ) -> Result<Self, RunnerError> {
        Ok(Self {
            population,
            library: Arc::new(library),
            tunables: Arc::new(config.tunables.clone()),
            clock: SimulationClock::new(&config.time)?,
            max_ticks: config.time.max_ticks,
            tick_interval: Duration::from_millis(config.time.tick_interval_ms),
        })
    }

    /// Advance the clock and tick every agent once.
    pub async fn step(&mut self) -> Result<TickSummary, RunnerError> {
        let tick = self.clock.advance()?;
        self.population
            .step(tick, self.clock.time_step(), &self.library, &self.tunables)
            .await
    }

    const fn limit_reached(&self) -> bool {
        self.max_ticks > 0 && self.clock.tick() >= self.max_ticks
    }
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if the clock overflows or a worker fails.
pub async fn run_simulation(
    simulation: &mut Simulation,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        agents = simulation.population.len(),
        max_ticks = simulation.max_ticks,
        tick_interval_ms = u64::try_from(simulation.tick_interval.as_millis()).unwrap_or(u64::MAX),
        time_step = simulation.clock.time_step(),
        "Simulation starting"
    );

    let end_reason = loop {
        if simulation.population.is_empty() {
            info!(tick = simulation.clock.tick(), "Population is empty");
            break SimulationEndReason::EmptyPopulation;
        }
        if simulation.limit_reached() {
            info!(max_ticks = simulation.max_ticks, "Max ticks reached");
            break SimulationEndReason::MaxTicksReached;
        }

        let summary = simulation.step().await?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, &mut simulation.population);
        last_summary = Some(summary);

        if !simulation.tick_interval.is_zero() {
            tokio::time::sleep(simulation.tick_interval).await;
        }
    };

    log_simulation_end(end_reason, total_ticks, last_summary.as_ref());
    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
    })
}

/// Log a summary of the finished run.
fn log_simulation_end(
    reason: SimulationEndReason,
    total_ticks: u64,
    last_summary: Option<&TickSummary>,
) {
    let (agents, intending) = last_summary.map_or((0, 0), |s| (s.agents, s.intending()));
    info!(
        reason = ?reason,
        total_ticks,
        agents,
        intending,
        "Simulation ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindset_agents::{CognitiveState, EngineConfig};
    use mindset_types::{AgentId, MentalState, Predicate};

    use super::*;
    use crate::library::{Plan, idle};

    fn simulation(max_ticks: u64, agents: usize) -> Simulation {
        let mut config = SimulationConfig::default();
        config.time.max_ticks = max_ticks;
        let mut population = Population::new(config.world.seed, config.population.parallel_threshold);
        for _ in 0..agents {
            let mut state =
                CognitiveState::new(AgentId::new(), EngineConfig::default(), &config.tunables);
            state.add_desire(None, MentalState::desire(Predicate::new("rest")));
            population.insert(state);
        }
        let library = Library::new().plan(Plan::new("rest", idle()).for_intention(Predicate::new("rest")));
        Simulation::new(&config, population, library).unwrap()
    }

    #[tokio::test]
    async fn max_ticks_stops_simulation() {
        let mut sim = simulation(5, 3);
        let result = run_simulation(&mut sim, &mut NoOpCallback).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(sim.clock.tick(), 5);
        let summary = result.final_summary.unwrap();
        assert_eq!(summary.tick, 5);
        assert_eq!(summary.intending(), 3);
    }

    #[tokio::test]
    async fn empty_population_stops_immediately() {
        let mut sim = simulation(0, 0);
        let result = run_simulation(&mut sim, &mut NoOpCallback).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::EmptyPopulation);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn callback_can_remove_agents() {
        struct Reaper {
            count: u64,
        }
        impl TickCallback for Reaper {
            fn on_tick(&mut self, _summary: &TickSummary, population: &mut Population) {
                self.count = self.count.saturating_add(1);
                let first = population.ids().next();
                if let Some(id) = first {
                    population.remove(&id);
                }
            }
        }

        let mut sim = simulation(0, 2);
        let mut reaper = Reaper { count: 0 };
        let result = run_simulation(&mut sim, &mut reaper).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::EmptyPopulation);
        assert_eq!(result.total_ticks, 2);
        assert_eq!(reaper.count, 2);
    }
}
