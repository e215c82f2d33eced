//! Shared builders for task unit tests.

use crate::task::{
    domain::{
        ActivityLogEntry, Category, Lane, NewTask, OwnerId, PersistedTaskData, Position, Task,
        TaskId, TaskPatch,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait]
    impl TaskStore for Store {
        async fn query_owned(&self, owner: &OwnerId) -> TaskStoreResult<Vec<Task>>;
        async fn get_one(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;
        async fn create_one(&self, task: NewTask) -> TaskStoreResult<TaskId>;
        async fn update_fields(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<()>;
        async fn append_to_log(&self, id: TaskId, entry: ActivityLogEntry) -> TaskStoreResult<()>;
        async fn delete_one(&self, id: TaskId) -> TaskStoreResult<()>;
        async fn commit_batch(&self, writes: Vec<(TaskId, TaskPatch)>) -> TaskStoreResult<()>;
    }
}

pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).expect("valid owner")
}

pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Builds a persisted task for `owner` at `lane`/`position`.
pub fn task(owner: &OwnerId, text: &str, lane: Lane, position: u32) -> Task {
    task_due(owner, text, lane, position, None)
}

/// Builds a persisted task with an optional due date.
pub fn task_due(
    owner: &OwnerId,
    text: &str,
    lane: Lane,
    position: u32,
    due_date: Option<NaiveDate>,
) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        owner: owner.clone(),
        text: text.to_owned(),
        description: None,
        category: Category::Work,
        due_date,
        lane,
        position: Position::new(position),
        version: 0,
        activity_log: Vec::new(),
        created_at: epoch(),
        updated_at: epoch(),
    })
}

/// Builds a lane of tasks named by `texts`, positioned densely from zero.
pub fn lane_of(owner: &OwnerId, lane: Lane, texts: &[&str]) -> Vec<Task> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            task(
                owner,
                text,
                lane,
                u32::try_from(index).expect("small lane"),
            )
        })
        .collect()
}

/// Returns `(text, position)` pairs for the tasks of `lane`, in order.
pub fn lane_view(tasks: &[Task], lane: Lane) -> Vec<(String, u32)> {
    tasks
        .iter()
        .filter(|task| task.lane() == lane)
        .map(|task| (task.text().to_owned(), task.position().value()))
        .collect()
}

/// Looks up a task by text.
pub fn by_text<'a>(tasks: &'a [Task], text: &str) -> &'a Task {
    tasks
        .iter()
        .find(|task| task.text() == text)
        .expect("task present")
}

pub fn persistence_error() -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other("store offline"))
}
