//! Task aggregate root, creation drafts, and partial-update patches.

use super::{
    ActivityAction, ActivityLogEntry, Category, Lane, OwnerId, Position, TaskDomainError, TaskId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated user input for creating or editing a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    text: String,
    description: Option<String>,
    category: Category,
    due_date: NaiveDate,
    lane: Lane,
}

impl TaskDraft {
    /// Creates a validated draft with required fields.
    ///
    /// The draft defaults to the work category and the todo lane.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyText`] when the text is blank and
    /// [`TaskDomainError::MissingDueDate`] when no due date is supplied.
    pub fn new(
        text: impl Into<String>,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, TaskDomainError> {
        let raw = text.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::EmptyText);
        }
        let due = due_date.ok_or(TaskDomainError::MissingDueDate)?;
        Ok(Self {
            text: raw,
            description: None,
            category: Category::default(),
            due_date: due,
            lane: Lane::Todo,
        })
    }

    /// Sets the description. Blank descriptions are dropped.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let value = description.into();
        self.description = (!value.trim().is_empty()).then_some(value);
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

    /// Returns the task text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns the lane.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }
}

/// Fields handed to the store when creating a task.
///
/// The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning identity.
    pub owner: OwnerId,
    /// Validated task fields.
    pub draft: TaskDraft,
    /// Initial position.
    pub position: Position,
    /// Initial activity log.
    pub activity_log: Vec<ActivityLogEntry>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates a new-task payload stamped with the current clock time and a
    /// single "Task Created" log entry.
    #[must_use]
    pub fn new(owner: OwnerId, draft: TaskDraft, position: Position, clock: &impl Clock) -> Self {
        let created = ActivityLogEntry::now(ActivityAction::Created, clock);
        Self {
            owner,
            draft,
            position,
            created_at: created.timestamp,
            activity_log: vec![created],
        }
    }

    /// Materialises the task under a store-assigned identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        let Self {
            owner,
            draft,
            position,
            activity_log,
            created_at,
        } = self;
        Task {
            id,
            owner,
            text: draft.text,
            description: draft.description,
            category: draft.category,
            due_date: Some(draft.due_date),
            lane: draft.lane,
            position,
            version: 0,
            activity_log,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Partial field update applied by the store.
///
/// `None` leaves a field untouched. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New text.
    pub text: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New category.
    pub category: Option<Category>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New lane.
    pub lane: Option<Lane>,
    /// New position.
    pub position: Option<Position>,
    /// Version the caller last observed; the store rejects the write when the
    /// stored version differs.
    pub expected_version: Option<u64>,
}

impl TaskPatch {
    /// Patch that rewrites lane and position only.
    #[must_use]
    pub const fn placement(lane: Lane, position: Position) -> Self {
        Self {
            text: None,
            description: None,
            category: None,
            due_date: None,
            lane: Some(lane),
            position: Some(position),
            expected_version: None,
        }
    }

    /// Patch carrying every user-editable field of a draft except the lane.
    #[must_use]
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            text: Some(draft.text.clone()),
            description: Some(draft.description.clone()),
            category: Some(draft.category),
            due_date: Some(draft.due_date),
            ..Self::default()
        }
    }

    /// Overlays the draft's editable fields onto this patch, keeping its
    /// placement and version guard.
    #[must_use]
    pub fn with_draft_fields(self, draft: &TaskDraft) -> Self {
        Self {
            lane: self.lane,
            position: self.position,
            expected_version: self.expected_version,
            ..Self::from_draft(draft)
        }
    }

    /// Requires the stored version to match before applying.
    #[must_use]
    pub const fn expecting_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: OwnerId,
    text: String,
    description: Option<String>,
    category: Category,
    due_date: Option<NaiveDate>,
    lane: Lane,
    position: Position,
    version: u64,
    activity_log: Vec<ActivityLogEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner identity.
    pub owner: OwnerId,
    /// Persisted text.
    pub text: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted category.
    pub category: Category,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted lane.
    pub lane: Lane,
    /// Persisted position within the lane.
    pub position: Position,
    /// Persisted write counter.
    pub version: u64,
    /// Persisted activity log in append order.
    pub activity_log: Vec<ActivityLogEntry>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            text: data.text,
            description: data.description,
            category: data.category,
            due_date: data.due_date,
            lane: data.lane,
            position: data.position,
            version: data.version,
            activity_log: data.activity_log,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning identity.
    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns `true` when `owner` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }

    /// Returns the task text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the current lane.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Returns the position within the lane.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the write counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the activity log in append order.
    #[must_use]
    pub fn activity_log(&self) -> &[ActivityLogEntry] {
        &self.activity_log
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a patch, bumping the version and update timestamp.
    ///
    /// Version checking is the store's responsibility; this method assumes
    /// the caller has already compared `expected_version`.
    pub fn apply_patch(&mut self, patch: &TaskPatch, at: DateTime<Utc>) {
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(lane) = patch.lane {
            self.lane = lane;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        self.version = self.version.saturating_add(1);
        self.updated_at = at;
    }

    /// Appends an entry to the activity log.
    pub fn push_activity(&mut self, entry: ActivityLogEntry) {
        self.activity_log.push(entry);
    }

    /// Moves the task to a lane slot without touching version or timestamps.
    ///
    /// Used by the reorder engine on its working copies.
    pub(crate) const fn place(&mut self, lane: Lane, position: Position) {
        self.lane = lane;
        self.position = position;
    }
}
