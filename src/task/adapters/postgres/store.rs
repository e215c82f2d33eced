//! `PostgreSQL` task store.

use super::{
    models::{ActivityRow, NewActivityRow, NewTaskRow, TaskChangeset, TaskRow},
    schema::{task_activity, tasks},
};
use crate::task::{
    domain::{
        ActivityLogEntry, Category, Lane, NewTask, OwnerId, PersistedTaskData, Position, Task,
        TaskId, TaskPatch,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// Batch commits run inside a single transaction with row locks on every
/// task they touch.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore<C: Clock + Send + Sync = DefaultClock> {
    pool: TaskPgPool,
    clock: Arc<C>,
}

impl PostgresTaskStore<DefaultClock> {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: TaskPgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }
}

impl<C: Clock + Send + Sync + 'static> PostgresTaskStore<C> {
    /// Creates a new store stamping updates with `clock`.
    #[must_use]
    pub const fn with_clock(pool: TaskPgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl<C: Clock + Send + Sync + 'static> TaskStore for PostgresTaskStore<C> {
    async fn query_owned(&self, owner: &OwnerId) -> TaskStoreResult<Vec<Task>> {
        let owner_id = owner.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner_id))
                .order((tasks::position.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn get_one(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            let hydrated = hydrate(connection, row.into_iter().collect())?;
            Ok(hydrated.into_iter().next())
        })
        .await
    }

    async fn create_one(&self, task: NewTask) -> TaskStoreResult<TaskId> {
        let id = TaskId::new();
        let new_row = to_new_row(id, &task)?;
        let entries = to_activity_rows(id, &task.activity_log);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(TaskStoreError::persistence)?;
                diesel::insert_into(task_activity::table)
                    .values(&entries)
                    .execute(tx)
                    .map_err(TaskStoreError::persistence)?;
                Ok(id)
            })
        })
        .await
    }

    async fn update_fields(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<()> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| apply_write(tx, id, &patch, now))
        })
        .await
    }

    async fn append_to_log(&self, id: TaskId, entry: ActivityLogEntry) -> TaskStoreResult<()> {
        let row = NewActivityRow {
            task_id: id.into_inner(),
            recorded_at: entry.timestamp,
            action: entry.action,
        };
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                lock_version(tx, id)?;
                diesel::insert_into(task_activity::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(TaskStoreError::persistence)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_one(&self, id: TaskId) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn commit_batch(&self, writes: Vec<(TaskId, TaskPatch)>) -> TaskStoreResult<()> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                for (id, patch) in &writes {
                    apply_write(tx, *id, patch, now)?;
                }
                Ok(())
            })
        })
        .await
    }
}

impl From<diesel::result::Error> for TaskStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

/// Locks the task row and returns its current version.
fn lock_version(connection: &mut PgConnection, id: TaskId) -> TaskStoreResult<u64> {
    let version = tasks::table
        .find(id.into_inner())
        .select(tasks::version)
        .for_update()
        .first::<i64>(connection)
        .optional()
        .map_err(TaskStoreError::persistence)?
        .ok_or(TaskStoreError::NotFound(id))?;
    u64::try_from(version).map_err(TaskStoreError::persistence)
}

fn apply_write(
    connection: &mut PgConnection,
    id: TaskId,
    patch: &TaskPatch,
    now: DateTime<Utc>,
) -> TaskStoreResult<()> {
    let actual = lock_version(connection, id)?;
    if let Some(expected) = patch.expected_version
        && expected != actual
    {
        return Err(TaskStoreError::VersionConflict {
            task: id,
            expected,
            actual,
        });
    }

    let changeset = to_changeset(patch)?;
    diesel::update(tasks::table.find(id.into_inner()))
        .set((
            &changeset,
            tasks::version.eq(tasks::version + 1_i64),
            tasks::updated_at.eq(now),
        ))
        .execute(connection)
        .map_err(TaskStoreError::persistence)?;
    Ok(())
}

/// Loads activity logs for `rows` and converts them into tasks, keeping the
/// row order.
fn hydrate(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskStoreResult<Vec<Task>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
    let activity = task_activity::table
        .filter(task_activity::task_id.eq_any(ids))
        .order(task_activity::id.asc())
        .select(ActivityRow::as_select())
        .load::<ActivityRow>(connection)
        .map_err(TaskStoreError::persistence)?;

    let mut logs: HashMap<uuid::Uuid, Vec<ActivityLogEntry>> = HashMap::new();
    for entry in activity {
        logs.entry(entry.task_id).or_default().push(ActivityLogEntry {
            timestamp: entry.recorded_at,
            action: entry.action,
        });
    }

    rows.into_iter()
        .map(|row| {
            let log = logs.remove(&row.id).unwrap_or_default();
            row_to_task(row, log)
        })
        .collect()
}

pub(super) fn to_new_row(id: TaskId, task: &NewTask) -> TaskStoreResult<NewTaskRow> {
    let position = i32::try_from(task.position.value()).map_err(TaskStoreError::persistence)?;
    Ok(NewTaskRow {
        id: id.into_inner(),
        owner_id: task.owner.as_str().to_owned(),
        text: task.draft.text().to_owned(),
        description: task.draft.description().map(str::to_owned),
        category: task.draft.category().as_str().to_owned(),
        due_date: Some(task.draft.due_date()),
        lane: task.draft.lane().as_str().to_owned(),
        position,
        version: 0,
        created_at: task.created_at,
        updated_at: task.created_at,
    })
}

fn to_activity_rows(id: TaskId, entries: &[ActivityLogEntry]) -> Vec<NewActivityRow> {
    entries
        .iter()
        .map(|entry| NewActivityRow {
            task_id: id.into_inner(),
            recorded_at: entry.timestamp,
            action: entry.action.clone(),
        })
        .collect()
}

pub(super) fn to_changeset(patch: &TaskPatch) -> TaskStoreResult<TaskChangeset> {
    let position = patch
        .position
        .map(|position| i32::try_from(position.value()))
        .transpose()
        .map_err(TaskStoreError::persistence)?;
    Ok(TaskChangeset {
        text: patch.text.clone(),
        description: patch.description.clone(),
        category: patch.category.map(|category| category.as_str().to_owned()),
        due_date: patch.due_date,
        lane: patch.lane.map(|lane| lane.as_str().to_owned()),
        position,
    })
}

pub(super) fn row_to_task(
    row: TaskRow,
    activity_log: Vec<ActivityLogEntry>,
) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        owner_id,
        text,
        description,
        category: persisted_category,
        due_date,
        lane: persisted_lane,
        position: persisted_position,
        version: persisted_version,
        created_at,
        updated_at,
    } = row;

    let owner = OwnerId::new(owner_id).map_err(TaskStoreError::persistence)?;
    let category =
        Category::try_from(persisted_category.as_str()).map_err(TaskStoreError::persistence)?;
    let lane = Lane::try_from(persisted_lane.as_str()).map_err(TaskStoreError::persistence)?;
    let position = u32::try_from(persisted_position).map_err(TaskStoreError::persistence)?;
    let version = u64::try_from(persisted_version).map_err(TaskStoreError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner,
        text,
        description,
        category,
        due_date,
        lane,
        position: Position::new(position),
        version,
        activity_log,
        created_at,
        updated_at,
    }))
}
