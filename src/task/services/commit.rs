//! Atomic persistence of reconciliation results.

use super::ActivityLog;
use crate::task::{
    domain::{ActivityAction, LaneTransition, Reconciliation, TaskDraft, TaskId, TaskPatch},
    ports::{TaskStore, TaskStoreResult},
};
use mockable::Clock;
use std::sync::Arc;

/// Outcome of a successful batch commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReport {
    /// Number of task placements written.
    pub written: usize,
    /// Lane transition that was logged, if the move changed lane.
    pub transition: Option<LaneTransition>,
}

/// Commits a reconciliation's changed placements as one atomic batch.
#[derive(Clone)]
pub struct BatchCommitter<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    activity: ActivityLog<S, C>,
}

impl<S, C> BatchCommitter<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a committer writing to `store` and logging to `activity`.
    #[must_use]
    pub const fn new(store: Arc<S>, activity: ActivityLog<S, C>) -> Self {
        Self { store, activity }
    }

    /// Writes every changed placement or none of them.
    ///
    /// After a successful write, exactly one status-change entry is recorded
    /// when the moved task changed lane. Position-only changes are not
    /// logged. A no-op reconciliation issues no store call.
    ///
    /// # Errors
    ///
    /// Returns the store error when the batch is rejected; nothing has been
    /// written in that case and no activity is recorded.
    pub async fn commit(&self, reconciliation: &Reconciliation) -> TaskStoreResult<CommitReport> {
        if reconciliation.is_noop() {
            return Ok(CommitReport {
                written: 0,
                transition: None,
            });
        }
        self.write(reconciliation, reconciliation.write_set(), false).await
    }

    /// Writes an edit that also moves the task to another lane.
    ///
    /// The draft's fields ride on the moved task's placement patch, so the
    /// edit and every placement land in one batch under the same version
    /// guards. On success an edit entry is recorded, followed by the
    /// status-change entry.
    ///
    /// # Errors
    ///
    /// Returns the store error when the batch is rejected; neither the edit
    /// nor any placement has been written in that case and no activity is
    /// recorded.
    pub async fn commit_edit(
        &self,
        reconciliation: &Reconciliation,
        draft: &TaskDraft,
    ) -> TaskStoreResult<CommitReport> {
        let edited = reconciliation.transition().map(|moved| moved.task_id);
        let writes = reconciliation
            .write_set()
            .into_iter()
            .map(|(id, patch)| {
                if Some(id) == edited {
                    (id, patch.with_draft_fields(draft))
                } else {
                    (id, patch)
                }
            })
            .collect();
        self.write(reconciliation, writes, true).await
    }

    async fn write(
        &self,
        reconciliation: &Reconciliation,
        writes: Vec<(TaskId, TaskPatch)>,
        edited: bool,
    ) -> TaskStoreResult<CommitReport> {
        let written = writes.len();
        if let Err(err) = self.store.commit_batch(writes).await {
            tracing::warn!(error = %err, written, "reorder batch rejected");
            return Err(err);
        }
        tracing::info!(written, "committed reorder batch");

        let transition = reconciliation.transition();
        if let Some(LaneTransition { task_id, from, to }) = transition {
            if edited {
                self.activity.record(task_id, ActivityAction::Edited).await;
            }
            self.activity
                .record(task_id, ActivityAction::StatusChanged { from, to })
                .await;
        }
        Ok(CommitReport {
            written,
            transition,
        })
    }
}
