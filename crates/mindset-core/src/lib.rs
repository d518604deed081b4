//! Deliberation, behaviour library and population runner for the Mindset
//! BDI engine.
//!
//! This crate owns the per-agent tick that drives every agent's mind:
//! perception and rule triggers, laws, social updates, coping, then
//! deliberation (intention persistence, selection, plan or norm dispatch)
//! and end-of-tick bookkeeping. Around it sit the behaviour library, the
//! seams to whatever authors behaviour, and the population runner that
//! ticks many agents in parallel over read-only snapshots.
//!
//! # Modules
//!
//! - [`clock`] -- Simulation clock with tick counter and time step.
//! - [`config`] -- Configuration loading from `mindset-config.yaml` into
//!   strongly-typed structs.
//! - [`collaborator`] -- Guards, evaluated expressions and the
//!   [`RandomSource`] seam.
//! - [`library`] -- Plans, norms, laws, sanctions and triggers.
//! - [`selection`] -- Choosing intentions, plans and norms.
//! - [`enforcement`] -- Sanctioning and rewarding other agents.
//! - [`tick`] -- The per-agent tick cycle ([`run_tick`]).
//! - [`population`] -- Every agent and the parallel fan-out of a tick.
//! - [`runner`] -- The simulation loop.
//!
//! [`RandomSource`]: collaborator::RandomSource
//! [`run_tick`]: tick::run_tick

pub mod clock;
pub mod collaborator;
pub mod config;
pub mod enforcement;
pub mod library;
pub mod population;
pub mod runner;
pub mod selection;
pub mod tick;

pub use collaborator::{Condition, Expr, GuardError, RandomSource, RngSource};
pub use library::{Law, Library, Norm, Plan, Sanction, Situation, Trigger, TriggerPhase};
pub use population::{Population, TickSummary};
pub use runner::{Simulation, SimulationResult, run_simulation};
pub use tick::{ExecutionResult, TickContext, TickError, run_tick};
