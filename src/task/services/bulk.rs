//! Bulk complete/delete over a caller-held selection.
//!
//! Unlike reorder commits, bulk writes are best-effort: every selected task
//! is written independently and one failure does not undo the others. The
//! caller gets a [`BulkReport`] listing what was applied, skipped, and failed.

use super::{ActivityLog, InvalidationFeed, InvalidationReason};
use crate::task::{
    domain::{ActivityAction, Lane, OwnerId, Position, Task, TaskId, TaskPatch},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use futures_util::stream::{self, StreamExt};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Tuning for bulk fan-out.
///
/// # Examples
///
/// ```
/// use tasklane::task::services::BulkActionConfig;
///
/// let config = BulkActionConfig::default();
/// assert_eq!(config.max_in_flight, 8);
///
/// let sequential = BulkActionConfig::sequential();
/// assert_eq!(sequential.max_in_flight, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkActionConfig {
    /// Maximum number of store writes in flight at once.
    pub max_in_flight: usize,
}

impl Default for BulkActionConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

impl BulkActionConfig {
    /// Issues one write at a time.
    #[must_use]
    pub const fn sequential() -> Self {
        Self { max_in_flight: 1 }
    }

    /// Sets the write concurrency. Zero is raised to one.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }
}

/// Ordered, duplicate-free set of selected task identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSelection {
    ids: Vec<TaskId>,
}

impl TaskSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Adds a task. Re-selecting a task keeps its original place.
    pub fn select(&mut self, id: TaskId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Removes a task.
    pub fn deselect(&mut self, id: TaskId) {
        self.ids.retain(|selected| *selected != id);
    }

    /// Selects an unselected task or deselects a selected one.
    pub fn toggle(&mut self, id: TaskId) {
        if self.contains(id) {
            self.deselect(id);
        } else {
            self.select(id);
        }
    }

    /// Returns `true` when `id` is selected.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the selected identifiers in selection order.
    #[must_use]
    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    /// Returns the number of selected tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when nothing is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<TaskId> for TaskSelection {
    fn from_iter<I: IntoIterator<Item = TaskId>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            selection.select(id);
        }
        selection
    }
}

/// Which bulk action produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Move the selection to the completed lane.
    Complete,
    /// Delete the selection.
    Delete,
}

/// Per-item results of a bulk action.
#[derive(Debug, Clone)]
pub struct BulkReport {
    /// Action that ran.
    pub action: BulkAction,
    /// Tasks whose write succeeded.
    pub applied: Vec<TaskId>,
    /// Tasks left alone: absent, not owned by the caller, or already in the
    /// target state.
    pub skipped: Vec<TaskId>,
    /// Tasks whose write failed, with the store error.
    pub failed: Vec<(TaskId, TaskStoreError)>,
}

impl BulkReport {
    const fn new(action: BulkAction) -> Self {
        Self {
            action,
            applied: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Returns `true` when no write failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn absorb(&mut self, results: Vec<(TaskId, TaskStoreResult<()>)>) {
        for (id, result) in results {
            match result {
                Ok(()) => self.applied.push(id),
                Err(TaskStoreError::NotFound(_)) => self.skipped.push(id),
                Err(err) => {
                    tracing::warn!(
                        task_id = %id,
                        action = ?self.action,
                        error = %err,
                        "bulk write failed"
                    );
                    self.failed.push((id, err));
                }
            }
        }
    }
}

/// Errors that stop a bulk action before any write is issued.
#[derive(Debug, Error)]
pub enum BulkActionError {
    /// The selection was empty.
    #[error("no tasks selected")]
    EmptySelection,
    /// Loading the owner's tasks failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Applies complete/delete to every task in a selection.
#[derive(Clone)]
pub struct BulkActionCoordinator<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    activity: ActivityLog<S, C>,
    feed: InvalidationFeed,
    config: BulkActionConfig,
}

impl<S, C> BulkActionCoordinator<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        activity: ActivityLog<S, C>,
        feed: InvalidationFeed,
        config: BulkActionConfig,
    ) -> Self {
        Self {
            store,
            activity,
            feed,
            config,
        }
    }

    /// Moves every selected task to the end of the completed lane, in
    /// selection order, and records a completion entry for each.
    ///
    /// Tasks that are absent, owned by someone else, or already completed are
    /// skipped. The selection is cleared when no write failed.
    ///
    /// # Errors
    ///
    /// Returns [`BulkActionError::EmptySelection`] without contacting the
    /// store when nothing is selected, or [`BulkActionError::Store`] when the
    /// owner's tasks cannot be loaded.
    pub async fn complete_all(
        &self,
        owner: &OwnerId,
        selection: &mut TaskSelection,
    ) -> Result<BulkReport, BulkActionError> {
        if selection.is_empty() {
            return Err(BulkActionError::EmptySelection);
        }
        let owned = self.owned_tasks(owner).await?;
        let mut report = BulkReport::new(BulkAction::Complete);

        // Deletions leave gaps, so the lane end follows the highest slot.
        let mut next_slot = owned
            .values()
            .filter(|task| task.lane() == Lane::Completed)
            .map(|task| task.position().value().saturating_add(1))
            .max()
            .unwrap_or(0);
        let mut plan = Vec::new();
        for &id in selection.ids() {
            match owned.get(&id) {
                Some(task) if task.lane() != Lane::Completed => {
                    let slot = Position::new(next_slot);
                    next_slot = next_slot.saturating_add(1);
                    plan.push((id, TaskPatch::placement(Lane::Completed, slot)));
                }
                _ => report.skipped.push(id),
            }
        }

        let results = self
            .fan_out(plan, |id, patch| async move {
                self.store.update_fields(id, patch).await?;
                self.activity
                    .record(id, ActivityAction::MarkedCompleted)
                    .await;
                Ok(())
            })
            .await;
        report.absorb(results);
        self.finish(owner, selection, &report, InvalidationReason::BulkCompleted);
        Ok(report)
    }

    /// Deletes every selected task owned by `owner`.
    ///
    /// Remaining positions are not renumbered. The selection is cleared when
    /// no write failed.
    ///
    /// # Errors
    ///
    /// Returns [`BulkActionError::EmptySelection`] without contacting the
    /// store when nothing is selected, or [`BulkActionError::Store`] when the
    /// owner's tasks cannot be loaded.
    pub async fn delete_all(
        &self,
        owner: &OwnerId,
        selection: &mut TaskSelection,
    ) -> Result<BulkReport, BulkActionError> {
        if selection.is_empty() {
            return Err(BulkActionError::EmptySelection);
        }
        let owned = self.owned_tasks(owner).await?;
        let mut report = BulkReport::new(BulkAction::Delete);

        let mut plan = Vec::new();
        for &id in selection.ids() {
            if owned.contains_key(&id) {
                plan.push((id, ()));
            } else {
                report.skipped.push(id);
            }
        }

        let results = self
            .fan_out(plan, |id, ()| async move { self.store.delete_one(id).await })
            .await;
        report.absorb(results);
        self.finish(owner, selection, &report, InvalidationReason::BulkDeleted);
        Ok(report)
    }

    async fn owned_tasks(&self, owner: &OwnerId) -> TaskStoreResult<HashMap<TaskId, Task>> {
        let tasks = self.store.query_owned(owner).await?;
        Ok(tasks.into_iter().map(|task| (task.id(), task)).collect())
    }

    /// Runs `write` for every planned item with bounded concurrency,
    /// returning results in plan order.
    async fn fan_out<P, F, Fut>(
        &self,
        plan: Vec<(TaskId, P)>,
        write: F,
    ) -> Vec<(TaskId, TaskStoreResult<()>)>
    where
        F: Fn(TaskId, P) -> Fut,
        Fut: Future<Output = TaskStoreResult<()>>,
    {
        let write_ref = &write;
        stream::iter(plan)
            .map(|(id, payload)| async move { (id, write_ref(id, payload).await) })
            .buffered(self.config.max_in_flight.max(1))
            .collect()
            .await
    }

    fn finish(
        &self,
        owner: &OwnerId,
        selection: &mut TaskSelection,
        report: &BulkReport,
        reason: InvalidationReason,
    ) {
        tracing::info!(
            action = ?report.action,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "bulk action finished"
        );
        if report.is_success() {
            selection.clear();
        }
        if !report.applied.is_empty() {
            self.feed.publish(owner, reason);
        }
    }
}
