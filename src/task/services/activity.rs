//! Append-only activity log service.

use crate::task::{
    domain::{ActivityLogEntry, TaskId},
    ports::{TaskStore, TaskStoreResult},
};
use mockable::Clock;
use std::sync::Arc;

/// Appends to and reads task activity logs.
///
/// Log writes never roll back the task mutation that triggered them; use
/// [`ActivityLog::record`] on mutation paths and [`ActivityLog::append`] when
/// the caller wants the error.
#[derive(Clone)]
pub struct ActivityLog<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ActivityLog<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new activity log service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Appends one entry stamped with the current instant.
    ///
    /// # Errors
    ///
    /// Returns the store error when the append fails, including
    /// [`crate::task::ports::TaskStoreError::NotFound`] for unknown tasks.
    pub async fn append(
        &self,
        task_id: TaskId,
        action: impl Into<String>,
    ) -> TaskStoreResult<ActivityLogEntry> {
        let entry = ActivityLogEntry::now(action, &*self.clock);
        self.store.append_to_log(task_id, entry.clone()).await?;
        Ok(entry)
    }

    /// Appends one entry, reporting failure on the log channel instead of
    /// returning it.
    ///
    /// Returns `true` when the entry was stored.
    pub async fn record(&self, task_id: TaskId, action: impl Into<String>) -> bool {
        let action_text: String = action.into();
        match self.append(task_id, action_text.as_str()).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    %task_id,
                    action = %action_text,
                    error = %err,
                    "failed to record task activity"
                );
                false
            }
        }
    }

    /// Returns a task's activity log in append order.
    ///
    /// Returns an empty sequence when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns the store error when the lookup fails.
    pub async fn fetch(&self, task_id: TaskId) -> TaskStoreResult<Vec<ActivityLogEntry>> {
        let task = self.store.get_one(task_id).await?;
        Ok(task
            .map(|found| found.activity_log().to_vec())
            .unwrap_or_default())
    }
}
