//! In-memory task store.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{ActivityLogEntry, NewTask, OwnerId, Task, TaskId, TaskPatch},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// Batch commits validate every write before applying any of them, so a
/// rejected batch leaves the state untouched.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore<C: Clock + Send + Sync = DefaultClock> {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
    clock: C,
}

impl InMemoryTaskStore<DefaultClock> {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DefaultClock)
    }
}

impl Default for InMemoryTaskStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Send + Sync> InMemoryTaskStore<C> {
    /// Creates an empty store stamping updates with `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Returns the number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no tasks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, HashMap<TaskId, Task>>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, HashMap<TaskId, Task>>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Checks that `patch` may be applied to the stored task.
fn check_write(
    tasks: &HashMap<TaskId, Task>,
    id: TaskId,
    patch: &TaskPatch,
) -> TaskStoreResult<()> {
    let task = tasks.get(&id).ok_or(TaskStoreError::NotFound(id))?;
    match patch.expected_version {
        Some(expected) if expected != task.version() => Err(TaskStoreError::VersionConflict {
            task: id,
            expected,
            actual: task.version(),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> TaskStore for InMemoryTaskStore<C> {
    async fn query_owned(&self, owner: &OwnerId) -> TaskStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut owned: Vec<Task> = state
            .values()
            .filter(|task| task.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by_key(|task| (task.position(), task.created_at(), task.id()));
        Ok(owned)
    }

    async fn get_one(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.get(&id).cloned())
    }

    async fn create_one(&self, task: NewTask) -> TaskStoreResult<TaskId> {
        let mut state = self.write()?;
        let mut id = TaskId::new();
        while state.contains_key(&id) {
            id = TaskId::new();
        }
        state.insert(id, task.into_task(id));
        Ok(id)
    }

    async fn update_fields(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        check_write(&state, id, &patch)?;
        let now = self.clock.utc();
        let task = state.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
        task.apply_patch(&patch, now);
        Ok(())
    }

    async fn append_to_log(&self, id: TaskId, entry: ActivityLogEntry) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        let task = state.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
        task.push_activity(entry);
        Ok(())
    }

    async fn delete_one(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        state.remove(&id);
        Ok(())
    }

    async fn commit_batch(&self, writes: Vec<(TaskId, TaskPatch)>) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        for (id, patch) in &writes {
            check_write(&state, *id, patch)?;
        }
        let now = self.clock.utc();
        for (id, patch) in &writes {
            if let Some(task) = state.get_mut(id) {
                task.apply_patch(patch, now);
            }
        }
        Ok(())
    }
}
