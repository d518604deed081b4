//! Shared value types for the Mindset BDI engine.
//!
//! Everything here is plain data with comparison semantics and no
//! behaviour beyond construction. The stores, appraisal and deliberation
//! live in `mindset-agents` and `mindset-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Agent identifiers and per-agent arena indices
//! - [`enums`] -- Modalities and emotion kinds
//! - [`predicate`] -- Propositions and their equality flavours
//! - [`emotion`] -- Emotions held in an emotion base
//! - [`mental_state`] -- Records stored in the six modality stores
//! - [`social_link`] -- Directed relationship scores
//! - [`personality`] -- OCEAN traits

pub mod emotion;
pub mod enums;
pub mod ids;
pub mod mental_state;
pub mod personality;
pub mod predicate;
pub mod social_link;

// Re-export all public types at crate root for convenience.
pub use emotion::Emotion;
pub use enums::{EmotionKind, Modality};
pub use ids::{AgentId, MentalStateId};
pub use mental_state::{DEFAULT_STRENGTH, MentalState, Payload};
pub use personality::{NEUTRAL_TRAIT, Personality};
pub use predicate::{AND_MARKER, OR_MARKER, Predicate};
pub use social_link::SocialLink;
