//! Runtime status of the norms an agent knows.
//!
//! A norm is *applied* on the ticks it is the one being executed and
//! *violated* on the ticks it was applicable but something else was chosen.
//! A violation is remembered for the norm's declared lifetime, after which
//! both the violation and any sanction for it are forgotten.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Violation lifetime used when a norm declares none.
pub const DEFAULT_VIOLATION_LIFETIME: u32 = 1;

/// Per-norm runtime flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormStatus {
    /// The norm was applicable but not followed.
    pub violated: bool,
    /// The norm was followed.
    pub applied: bool,
    /// A sanction or reward was already issued for the current status.
    pub sanctioned: bool,
    /// Remaining ticks of the current status. `None` when not counting.
    pub countdown: Option<i64>,
}

impl NormStatus {
    /// Mark as violated for `lifetime` ticks.
    pub fn mark_violated(&mut self, lifetime: Option<u32>) {
        self.violated = true;
        self.applied = false;
        self.countdown = Some(i64::from(lifetime.unwrap_or(DEFAULT_VIOLATION_LIFETIME)));
    }

    /// Mark as applied. The flag clears together with any sanction on the
    /// next lifetime update.
    pub const fn mark_applied(&mut self) {
        self.applied = true;
        self.violated = false;
        self.countdown = Some(-1);
    }

    /// Advance the violation countdown by one tick.
    pub fn tick(&mut self) {
        let Some(mut remaining) = self.countdown else {
            return;
        };
        if self.violated {
            remaining = remaining.saturating_sub(1);
        }
        if remaining < 0 {
            self.violated = false;
            self.sanctioned = false;
            self.countdown = None;
        } else {
            self.countdown = Some(remaining);
        }
    }
}

/// Statuses of every norm known to one agent, keyed by norm name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormBook {
    statuses: BTreeMap<String, NormStatus>,
}

impl NormBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            statuses: BTreeMap::new(),
        }
    }

    /// Status of `norm`, if it was ever tracked.
    pub fn get(&self, norm: &str) -> Option<&NormStatus> {
        self.statuses.get(norm)
    }

    /// Status of `norm`, created on first use.
    pub fn entry(&mut self, norm: &str) -> &mut NormStatus {
        self.statuses.entry(norm.to_owned()).or_default()
    }

    /// True if `norm` is currently violated.
    pub fn is_violated(&self, norm: &str) -> bool {
        self.get(norm).is_some_and(|status| status.violated)
    }

    /// True if `norm` is currently applied.
    pub fn is_applied(&self, norm: &str) -> bool {
        self.get(norm).is_some_and(|status| status.applied)
    }

    /// Clear every sanctioned flag.
    pub fn reset_sanctions(&mut self) {
        for status in self.statuses.values_mut() {
            status.sanctioned = false;
        }
    }

    /// Advance every countdown by one tick.
    pub fn tick(&mut self) {
        for status in self.statuses.values_mut() {
            status.tick();
        }
    }

    /// Iterate over `(norm, status)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormStatus)> {
        self.statuses.iter().map(|(name, status)| (name.as_str(), status))
    }
}
