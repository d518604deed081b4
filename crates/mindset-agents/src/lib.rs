//! Per-agent cognition for the Mindset BDI engine.
//!
//! This crate holds everything that operates on one agent's mind without
//! touching I/O, clocks or randomness. It sits between `mindset-types`
//! (the value types) and `mindset-core` (selection, the deliberation tick
//! and the population runner).
//!
//! # Modules
//!
//! - [`store`] -- Arena-backed mental-state store ([`MentalStateStore`])
//! - [`cognitive`] -- The per-agent state and its add/remove/query operations ([`CognitiveState`])
//! - [`appraisal`] -- Declarative emotion appraisal rules and their interpreter
//! - [`emotions`] -- The emotion base with its merge law and decay ([`EmotionBase`])
//! - [`social`] -- Social link updates and emotions about partners
//! - [`contagion`] -- Emotional contagion between agents ([`Contagion`])
//! - [`snapshot`] -- Read-only copies of other agents ([`AgentSnapshot`])
//! - [`personality`] -- Dispositions derived from OCEAN traits ([`Dispositions`])
//! - [`norms`] -- Norm violation and application bookkeeping ([`NormBook`])
//! - [`thoughts`] -- Bounded trace of recent thoughts ([`ThoughtLog`])
//! - [`config`] -- Architecture switches and tunables ([`EngineConfig`], [`CognitionTunables`])
//! - [`error`] -- Error types ([`CognitionError`])

pub mod appraisal;
pub mod cognitive;
pub mod config;
pub mod contagion;
pub mod emotions;
pub mod error;
pub mod norms;
pub mod personality;
pub mod snapshot;
pub mod social;
pub mod store;
pub mod thoughts;

// Re-export primary types at crate root for convenience.
pub use cognitive::CognitiveState;
pub use config::{CognitionTunables, EngineConfig};
pub use contagion::{Contagion, spread};
pub use emotions::EmotionBase;
pub use error::CognitionError;
pub use norms::{NormBook, NormStatus};
pub use personality::Dispositions;
pub use snapshot::{AgentSnapshot, SnapshotMap};
pub use store::MentalStateStore;
pub use thoughts::ThoughtLog;
