//! Lane-grouped view of an owner's tasks.

use super::{Lane, Task, reorder::sort_for_board};
use serde::{Deserialize, Serialize};

/// An owner's tasks grouped into lanes, each lane in position order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    todo: Vec<Task>,
    in_progress: Vec<Task>,
    completed: Vec<Task>,
}

impl BoardSnapshot {
    /// Groups tasks by lane.
    #[must_use]
    pub fn from_tasks(mut tasks: Vec<Task>) -> Self {
        sort_for_board(&mut tasks);
        let mut snapshot = Self::default();
        for task in tasks {
            match task.lane() {
                Lane::Todo => snapshot.todo.push(task),
                Lane::InProgress => snapshot.in_progress.push(task),
                Lane::Completed => snapshot.completed.push(task),
            }
        }
        snapshot
    }

    /// Returns the tasks in `lane`.
    #[must_use]
    pub fn lane(&self, lane: Lane) -> &[Task] {
        match lane {
            Lane::Todo => &self.todo,
            Lane::InProgress => &self.in_progress,
            Lane::Completed => &self.completed,
        }
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    /// Returns `true` when the board has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
