//! Board invalidation signals.
//!
//! Mutating services publish an invalidation after every successful write;
//! collaborators subscribe and pull a fresh board when one arrives.

use crate::task::domain::{OwnerId, TaskId};
use tokio::sync::broadcast;

/// Why an owner's board went stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// A task was created.
    TaskCreated(TaskId),
    /// A task's fields were edited.
    TaskEdited(TaskId),
    /// A task was deleted.
    TaskDeleted(TaskId),
    /// A task moved and the affected lanes were renumbered.
    TaskMoved(TaskId),
    /// Lanes were re-ranked by due date.
    LanesSorted,
    /// A bulk complete applied at least one write.
    BulkCompleted,
    /// A bulk delete applied at least one write.
    BulkDeleted,
}

/// Signal that an owner's board must be re-fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInvalidation {
    /// Owner whose tasks changed.
    pub owner: OwnerId,
    /// What changed.
    pub reason: InvalidationReason,
}

/// Broadcast channel for [`BoardInvalidation`] signals.
#[derive(Debug, Clone)]
pub struct InvalidationFeed {
    sender: broadcast::Sender<BoardInvalidation>,
}

impl InvalidationFeed {
    /// Buffered signals per subscriber before lagging receivers drop old ones.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a feed buffering up to `capacity` signals per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future invalidations.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardInvalidation> {
        self.sender.subscribe()
    }

    /// Publishes an invalidation, returning how many subscribers received it.
    pub fn publish(&self, owner: &OwnerId, reason: InvalidationReason) -> usize {
        self.sender
            .send(BoardInvalidation {
                owner: owner.clone(),
                reason,
            })
            .unwrap_or_default()
    }
}

impl Default for InvalidationFeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
