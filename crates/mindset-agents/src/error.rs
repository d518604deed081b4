//! Error types for the mindset-agents crate.
//!
//! Store operations report "absent", "already present" and "guard unmet"
//! through `bool` and `Option` returns. The errors here cover the rare
//! conditions that are genuine faults: an exhausted arena or an invalid
//! tunable.

use mindset_types::AgentId;

/// Errors that can occur while manipulating a cognitive state.
#[derive(Debug, thiserror::Error)]
pub enum CognitionError {
    /// The per-agent arena ran out of identifiers.
    #[error("mental-state arena exhausted for agent {owner}")]
    ArenaExhausted {
        /// Agent whose store is full.
        owner: AgentId,
    },

    /// A tunable was outside its accepted range.
    #[error("invalid tunable {name}: {value}")]
    InvalidTunable {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value, rendered for display.
        value: String,
    },
}
