//! Store port for task persistence, batch commits, and activity logs.

use crate::task::domain::{ActivityLogEntry, NewTask, OwnerId, Task, TaskId, TaskPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// Implementations must make [`TaskStore::commit_batch`] all-or-nothing;
/// every other write affects a single task.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task owned by `owner`, ordered by position ascending.
    ///
    /// Callers re-sort by lane then position.
    async fn query_owned(&self, owner: &OwnerId) -> TaskStoreResult<Vec<Task>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get_one(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Stores a new task and returns its assigned identifier.
    async fn create_one(&self, task: NewTask) -> TaskStoreResult<TaskId>;

    /// Applies a partial update to one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::VersionConflict`] when the patch carries an expected
    /// version that does not match.
    async fn update_fields(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<()>;

    /// Appends an entry to a task's activity log.
    ///
    /// Entries are kept as a sequence; identical entries are not coalesced.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn append_to_log(&self, id: TaskId, entry: ActivityLogEntry) -> TaskStoreResult<()>;

    /// Deletes a task. Deleting an absent task succeeds.
    async fn delete_one(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Applies every patch or none of them.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskStoreError::NotFound`] or
    /// [`TaskStoreError::VersionConflict`] encountered; in that case no patch
    /// has been applied.
    async fn commit_batch(&self, writes: Vec<(TaskId, TaskPatch)>) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored version differs from the one the writer observed.
    #[error("version conflict on task {task}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Task whose version moved on.
        task: TaskId,
        /// Version the writer observed.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
