//! Activity log entries.

use super::Lane;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One append-only record in a task's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Instant the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Human-readable description of what happened.
    pub action: String,
}

impl ActivityLogEntry {
    /// Creates an entry stamped with the current clock time.
    #[must_use]
    pub fn now(action: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            timestamp: clock.utc(),
            action: action.into(),
        }
    }
}

/// Actions the tracker writes to activity logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    /// The task was created.
    Created,
    /// One or more task fields were edited.
    Edited,
    /// The task was deleted.
    Deleted,
    /// The task moved between lanes.
    StatusChanged {
        /// Lane before the move.
        from: Lane,
        /// Lane after the move.
        to: Lane,
    },
    /// The task was completed through a bulk action.
    MarkedCompleted,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("Task Created"),
            Self::Edited => f.write_str("Task Edited"),
            Self::Deleted => f.write_str("Task Deleted"),
            Self::StatusChanged { from, to } => {
                write!(f, "You changed status from {from} to {to}")
            }
            Self::MarkedCompleted => f.write_str("You marked it as completed"),
        }
    }
}

impl From<ActivityAction> for String {
    fn from(action: ActivityAction) -> Self {
        action.to_string()
    }
}
