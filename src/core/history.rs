//! Transition history tracking.
//!
//! History is an append-only audit trail. Entries are never rewritten or
//! evicted by the engine.

use super::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{Event, HistoryEntry, State};
/// use chrono::Utc;
///
/// let entry = HistoryEntry {
///     from: State::from("Draft"),
///     to: State::from("InReview"),
///     on: Event::from("Submit"),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(entry.to, "InReview");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The state being left
    pub from: State,
    /// The state being entered
    pub to: State,
    /// The event that triggered the transition
    pub on: Event,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(from: State, to: State, on: Event) -> Self {
        Self {
            from,
            to,
            on,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of committed transitions.
///
/// Serializes as a bare array of entries.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{Event, HistoryEntry, State, StateHistory};
///
/// let mut history = StateHistory::new();
/// history.record(HistoryEntry::now("Draft".into(), "InReview".into(), Event::from("Submit")));
/// history.record(HistoryEntry::now("InReview".into(), "Approved".into(), Event::from("Approve")));
///
/// let path = history.path();
/// assert_eq!(path.len(), 3); // Draft -> InReview -> Approved
/// assert_eq!(path[0], &State::from("Draft"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateHistory {
    entries: Vec<HistoryEntry>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first entry followed by the `to`
    /// state of every entry. Empty when nothing was recorded.
    pub fn path(&self) -> Vec<&State> {
        let mut path = Vec::with_capacity(self.entries.len() + 1);
        if let Some(first) = self.entries.first() {
            path.push(&first.from);
        }
        for entry in &self.entries {
            path.push(&entry.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no entries or the timestamps run
    /// backwards (possible after restoring hand-edited snapshots).
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.entries.first()?, self.entries.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}

impl From<Vec<HistoryEntry>> for StateHistory {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }
}
