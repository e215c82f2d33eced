//! Diesel row models for task persistence.

use super::schema::{task_activity, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning identity.
    pub owner_id: String,
    /// Task text.
    pub text: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category storage name.
    pub category: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Lane storage name.
    pub lane: String,
    /// Position within the lane.
    pub position: i32,
    /// Write counter.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning identity.
    pub owner_id: String,
    /// Task text.
    pub text: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category storage name.
    pub category: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Lane storage name.
    pub lane: String,
    /// Position within the lane.
    pub position: i32,
    /// Write counter.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update for task records; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// New text.
    pub text: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New category storage name.
    pub category: Option<String>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New lane storage name.
    pub lane: Option<String>,
    /// New position.
    pub position: Option<i32>,
}

/// Query result row for activity entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_activity)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Instant recorded.
    pub recorded_at: DateTime<Utc>,
    /// Action description.
    pub action: String,
}

/// Insert model for activity entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_activity)]
pub struct NewActivityRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Instant recorded.
    pub recorded_at: DateTime<Utc>,
    /// Action description.
    pub action: String,
}
