//! Bounded trace of what the agent was thinking.

use std::collections::VecDeque;

/// Newest-first log of trace notes, capped at a fixed capacity.
#[derive(Debug, Clone)]
pub struct ThoughtLog {
    capacity: usize,
    entries: VecDeque<String>,
}

impl ThoughtLog {
    /// Create an empty log holding at most `capacity` notes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a note, dropping the oldest once full.
    pub fn record(&mut self, note: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(note.into());
        self.entries.truncate(self.capacity);
    }

    /// The most recent note.
    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    /// Notes, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of notes held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no note has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
