//! UI-facing task board service.
//!
//! Every operation takes the caller's [`OwnerId`]. Tasks owned by someone
//! else are indistinguishable from absent tasks, and operations on absent
//! tasks are benign no-ops.

use super::{
    ActivityLog, BatchCommitter, BulkActionConfig, BulkActionCoordinator, InvalidationFeed,
    InvalidationReason,
};
use crate::task::{
    domain::{
        ActivityAction, ActivityLogEntry, BoardSnapshot, Category, Lane, MoveRequest, NewTask,
        OwnerId, Position, Reconciliation, SortOrder, Task, TaskDomainError, TaskDraft, TaskId,
        TaskPatch, rank_by_due_date, reconcile, sort_for_board,
    },
    ports::{TaskStore, TaskStoreError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Raw create/edit form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    text: String,
    due_date: Option<NaiveDate>,
    description: Option<String>,
    category: Category,
    lane: Lane,
}

impl TaskRequest {
    /// Creates a request with the task text and due date.
    #[must_use]
    pub fn new(text: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Self {
            text: text.into(),
            due_date,
            description: None,
            category: Category::default(),
            lane: Lane::Todo,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the lane.
    #[must_use]
    pub const fn with_lane(mut self, lane: Lane) -> Self {
        self.lane = lane;
        self
    }

    fn into_draft(self) -> Result<TaskDraft, TaskDomainError> {
        let mut draft = TaskDraft::new(self.text, self.due_date)?
            .with_category(self.category)
            .with_lane(self.lane);
        if let Some(description) = self.description {
            draft = draft.with_description(description);
        }
        Ok(draft)
    }
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum TaskBoardError {
    /// Input validation failed; the store was not contacted.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for board service operations.
pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

/// Task board orchestration service.
#[derive(Clone)]
pub struct TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    activity: ActivityLog<S, C>,
    committer: BatchCommitter<S, C>,
    feed: InvalidationFeed,
}

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a board service with its own invalidation feed.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_feed(store, clock, InvalidationFeed::default())
    }

    /// Creates a board service publishing to `feed`.
    #[must_use]
    pub fn with_feed(store: Arc<S>, clock: Arc<C>, feed: InvalidationFeed) -> Self {
        let activity = ActivityLog::new(Arc::clone(&store), Arc::clone(&clock));
        let committer = BatchCommitter::new(
            Arc::clone(&store),
            ActivityLog::new(Arc::clone(&store), Arc::clone(&clock)),
        );
        Self {
            store,
            clock,
            activity,
            committer,
            feed,
        }
    }

    /// Returns the invalidation feed this service publishes to.
    #[must_use]
    pub const fn feed(&self) -> &InvalidationFeed {
        &self.feed
    }

    /// Returns the activity log service.
    #[must_use]
    pub const fn activity_log(&self) -> &ActivityLog<S, C> {
        &self.activity
    }

    /// Builds a bulk action coordinator sharing this service's store, clock,
    /// and feed.
    #[must_use]
    pub fn bulk_actions(&self, config: BulkActionConfig) -> BulkActionCoordinator<S, C> {
        BulkActionCoordinator::new(
            Arc::clone(&self.store),
            ActivityLog::new(Arc::clone(&self.store), Arc::clone(&self.clock)),
            self.feed.clone(),
            config,
        )
    }

    /// Creates a task at the end of the owner's todo lane count.
    ///
    /// The position is the number of the owner's tasks currently in the todo
    /// lane, whatever lane the request selects. The task starts with a single
    /// "Task Created" entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] for blank text or a missing due
    /// date, before any store call, and [`TaskBoardError::Store`] when
    /// persistence fails.
    pub async fn create_task(
        &self,
        owner: &OwnerId,
        request: TaskRequest,
    ) -> TaskBoardResult<Task> {
        let draft = request.into_draft()?;
        let todo_count = self
            .store
            .query_owned(owner)
            .await?
            .iter()
            .filter(|task| task.lane() == Lane::Todo)
            .count();

        let new_task = NewTask::new(
            owner.clone(),
            draft,
            Position::from_index(todo_count),
            &*self.clock,
        );
        let id = self.store.create_one(new_task.clone()).await?;
        let task = new_task.into_task(id);
        tracing::info!(
            task_id = %id,
            lane = %task.lane(),
            position = %task.position(),
            "created task"
        );
        self.feed.publish(owner, InvalidationReason::TaskCreated(id));
        Ok(task)
    }

    /// Edits a task's fields.
    ///
    /// A lane change moves the task to the end of the destination lane
    /// through the reorder engine, so both lanes stay dense. The field edit
    /// and the placements are then committed as one version-guarded batch,
    /// and a status-change entry follows the edit entry. Returns `Ok(None)`
    /// when the task is absent or not owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] for invalid input, before any store
    /// call, and [`TaskBoardError::Store`] when persistence fails.
    pub async fn edit_task(
        &self,
        owner: &OwnerId,
        id: TaskId,
        request: TaskRequest,
    ) -> TaskBoardResult<Option<Task>> {
        let draft = request.into_draft()?;
        let Some(current) = self.owned_task(owner, id).await? else {
            return Ok(None);
        };

        if draft.lane() == current.lane() {
            self.store
                .update_fields(id, TaskPatch::from_draft(&draft))
                .await?;
            self.activity.record(id, ActivityAction::Edited).await;
        } else {
            let tasks = self.store.query_owned(owner).await?;
            let to_lane_end = MoveRequest::new(id, draft.lane(), usize::MAX);
            let Some(reconciliation) = reconcile(&tasks, &to_lane_end) else {
                return Ok(None);
            };
            self.committer.commit_edit(&reconciliation, &draft).await?;
        }

        tracing::info!(task_id = %id, "edited task");
        self.feed.publish(owner, InvalidationReason::TaskEdited(id));
        Ok(self.store.get_one(id).await?)
    }

    /// Deletes a task.
    ///
    /// Positions in the task's former lane are not renumbered. Returns
    /// `Ok(false)` when the task is absent or not owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when persistence fails.
    pub async fn delete_task(&self, owner: &OwnerId, id: TaskId) -> TaskBoardResult<bool> {
        if self.owned_task(owner, id).await?.is_none() {
            return Ok(false);
        }
        // Stores drop the log with the task, so this entry is only kept when
        // the delete itself fails.
        self.activity.record(id, ActivityAction::Deleted).await;
        self.store.delete_one(id).await?;
        tracing::info!(task_id = %id, "deleted task");
        self.feed.publish(owner, InvalidationReason::TaskDeleted(id));
        Ok(true)
    }

    /// Returns the owner's tasks sorted by lane then position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when the query fails.
    pub async fn list_tasks(&self, owner: &OwnerId) -> TaskBoardResult<Vec<Task>> {
        let mut tasks = self.store.query_owned(owner).await?;
        sort_for_board(&mut tasks);
        Ok(tasks)
    }

    /// Returns the owner's tasks grouped by lane.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when the query fails.
    pub async fn board(&self, owner: &OwnerId) -> TaskBoardResult<BoardSnapshot> {
        let tasks = self.store.query_owned(owner).await?;
        Ok(BoardSnapshot::from_tasks(tasks))
    }

    /// Moves a task and commits the reconciled placements atomically.
    ///
    /// Returns `Ok(None)` when the move has no destination or the task is
    /// absent or not owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when loading or committing fails;
    /// a rejected commit leaves the stored placements untouched.
    pub async fn move_task(
        &self,
        owner: &OwnerId,
        request: MoveRequest,
    ) -> TaskBoardResult<Option<Reconciliation>> {
        if request.destination.is_none() {
            return Ok(None);
        }
        let tasks = self.store.query_owned(owner).await?;
        let Some(reconciliation) = reconcile(&tasks, &request) else {
            return Ok(None);
        };
        self.committer.commit(&reconciliation).await?;
        if !reconciliation.is_noop() {
            self.feed
                .publish(owner, InvalidationReason::TaskMoved(request.task_id));
        }
        Ok(Some(reconciliation))
    }

    /// Re-ranks every lane by due date and commits the result atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when loading or committing fails.
    pub async fn sort_by_due_date(
        &self,
        owner: &OwnerId,
        order: SortOrder,
    ) -> TaskBoardResult<Reconciliation> {
        let tasks = self.store.query_owned(owner).await?;
        let reconciliation = rank_by_due_date(&tasks, order);
        self.committer.commit(&reconciliation).await?;
        if !reconciliation.is_noop() {
            self.feed.publish(owner, InvalidationReason::LanesSorted);
        }
        Ok(reconciliation)
    }

    /// Returns a task's activity log in append order.
    ///
    /// Returns an empty sequence when the task is absent or not owned by
    /// `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when the lookup fails.
    pub async fn activity(
        &self,
        owner: &OwnerId,
        id: TaskId,
    ) -> TaskBoardResult<Vec<ActivityLogEntry>> {
        Ok(self
            .owned_task(owner, id)
            .await?
            .map(|task| task.activity_log().to_vec())
            .unwrap_or_default())
    }

    async fn owned_task(&self, owner: &OwnerId, id: TaskId) -> TaskBoardResult<Option<Task>> {
        let task = self.store.get_one(id).await?;
        Ok(task.filter(|found| found.is_owned_by(owner)))
    }
}
