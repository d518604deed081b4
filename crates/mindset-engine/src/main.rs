//! Engine binary for the Mindset BDI simulation.
//!
//! This is the main entry point that wires together configuration, the
//! population spawner, the demonstration behaviour library and the
//! simulation runner, then runs until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `mindset-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Spawn the seeded population
//! 4. Build the village library
//! 5. Run the simulation loop
//! 6. Log the result

mod error;
mod report;
mod scenario;
mod spawner;

use std::path::{Path, PathBuf};

use mindset_core::config::{LoggingConfig, SimulationConfig};
use mindset_core::runner::{self, Simulation};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report::ReportCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "mindset-config.yaml";

/// Ticks between population reports.
const REPORT_EVERY: u64 = 10;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging setup or the simulation
/// itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!("mindset-engine starting");
    if !found {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        time_step = config.time.time_step,
        max_ticks = config.time.max_ticks,
        engine = ?config.engine,
        "Configuration loaded"
    );

    // 3. Spawn the population.
    let mut rng = SmallRng::seed_from_u64(config.world.seed);
    let population = spawner::spawn_population(&config, &mut rng);

    // 4. Build the behaviour library.
    let library = scenario::village();

    // 5. Run the simulation.
    let mut simulation = Simulation::new(&config, population, library)?;
    let mut callback = ReportCallback::new(REPORT_EVERY);
    let result = runner::run_simulation(&mut simulation, &mut callback).await?;

    // 6. Log results.
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "mindset-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration, falling back to defaults when the
/// file does not exist. The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::Logging {
            level: logging.level.clone(),
            message: e.to_string(),
        })?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
