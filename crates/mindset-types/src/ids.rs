//! Type-safe identifier wrappers.
//!
//! Agents carry a UUID v7 identifier so that populations built in different
//! runs never collide. Mental states live in a per-agent arena and are
//! addressed by a small monotonically increasing [`MentalStateId`] that is
//! only meaningful inside the owning agent's store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent owning a cognitive state.
    AgentId
}

/// Arena index of a mental-state record inside one agent's store.
///
/// Identifiers are handed out in increasing order and never reused, so a
/// stale identifier simply fails to resolve after its record is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MentalStateId(pub u64);

impl MentalStateId {
    /// The first identifier an empty arena hands out.
    pub const FIRST: Self = Self(0);

    /// Return the identifier following this one, or `None` on exhaustion.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Return the raw arena index.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for MentalStateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ms#{}", self.0)
    }
}
