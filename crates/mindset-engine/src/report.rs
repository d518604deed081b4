//! Periodic population report.
//!
//! [`ReportCallback`] implements the runner's [`TickCallback`] and logs an
//! aggregate view of the population every few ticks: how many agents are
//! pursuing something, how many emotions and obligations are held, and how
//! many norms currently stand violated.

use std::collections::BTreeMap;

use mindset_core::Population;
use mindset_core::population::TickSummary;
use mindset_core::runner::TickCallback;
use mindset_types::Modality;
use tracing::info;

/// Aggregate counts over the whole population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationReport {
    /// Emotions held, keyed by emotion name.
    pub emotions: BTreeMap<String, usize>,
    /// Obligations held.
    pub obligations: usize,
    /// Norm statuses currently violated.
    pub violations: usize,
    /// Norm statuses sanctioned since their last selection.
    pub sanctioned: usize,
}

impl PopulationReport {
    /// Count over every agent in `population`.
    pub fn of(population: &Population) -> Self {
        let mut report = Self::default();
        for state in population.iter() {
            for emotion in state.emotions().iter() {
                let count = report
                    .emotions
                    .entry(emotion.kind.as_str().to_owned())
                    .or_default();
                *count = count.saturating_add(1);
            }
            report.obligations = report
                .obligations
                .saturating_add(state.store().len(Modality::Obligation));
            for (_, status) in state.norms.iter() {
                if status.violated {
                    report.violations = report.violations.saturating_add(1);
                }
                if status.sanctioned {
                    report.sanctioned = report.sanctioned.saturating_add(1);
                }
            }
        }
        report
    }
}

/// Logs a [`PopulationReport`] every `every` ticks.
pub struct ReportCallback {
    every: u64,
}

impl ReportCallback {
    /// Report every `every` ticks (0 disables reporting).
    pub const fn new(every: u64) -> Self {
        Self { every }
    }

    fn due(&self, tick: u64) -> bool {
        tick.checked_rem(self.every).is_some_and(|r| r == 0)
    }
}

impl TickCallback for ReportCallback {
    fn on_tick(&mut self, summary: &TickSummary, population: &mut Population) {
        if !self.due(summary.tick) {
            return;
        }
        let report = PopulationReport::of(population);
        info!(
            tick = summary.tick,
            agents = summary.agents,
            intending = summary.intending(),
            dispatched = summary.dispatched(),
            obligations = report.obligations,
            violations = report.violations,
            sanctioned = report.sanctioned,
            emotions = ?report.emotions,
            "Population report"
        );
    }
}
