//! Lane/position reconciliation.
//!
//! The functions here are pure: they take the owner's current tasks and
//! return the new ordering together with the minimal set of placement
//! changes that must be persisted. Nothing in this module touches a store.

use super::{Lane, Position, Task, TaskId, TaskPatch};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Where a moved task should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Destination lane.
    pub lane: Lane,
    /// Index within the destination lane's visible sequence.
    ///
    /// Values past the end of the lane append.
    pub index: usize,
}

impl Destination {
    /// Creates a destination.
    #[must_use]
    pub const fn new(lane: Lane, index: usize) -> Self {
        Self { lane, index }
    }
}

/// A reported move of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Task being moved.
    pub task_id: TaskId,
    /// Drop target; `None` when the drag was cancelled.
    pub destination: Option<Destination>,
}

impl MoveRequest {
    /// Creates a move to `lane` at `index`.
    #[must_use]
    pub const fn new(task_id: TaskId, lane: Lane, index: usize) -> Self {
        Self {
            task_id,
            destination: Some(Destination::new(lane, index)),
        }
    }

    /// Creates a move with no drop target.
    #[must_use]
    pub const fn cancelled(task_id: TaskId) -> Self {
        Self {
            task_id,
            destination: None,
        }
    }
}

/// Direction for due-date ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Earliest due date first.
    Ascending,
    /// Latest due date first.
    Descending,
}

/// New placement for a task whose lane or position changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    /// Task being re-placed.
    pub task_id: TaskId,
    /// Lane after reconciliation.
    pub lane: Lane,
    /// Position after reconciliation.
    pub position: Position,
    /// Lane before reconciliation.
    pub previous_lane: Lane,
    /// Position before reconciliation.
    pub previous_position: Position,
    /// Task version the engine worked from.
    pub seen_version: u64,
}

impl PositionChange {
    /// Converts the change into a version-guarded placement patch.
    #[must_use]
    pub const fn to_patch(&self) -> TaskPatch {
        TaskPatch::placement(self.lane, self.position).expecting_version(self.seen_version)
    }
}

/// Lane change of the moved task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneTransition {
    /// Task that changed lane.
    pub task_id: TaskId,
    /// Lane it left.
    pub from: Lane,
    /// Lane it joined.
    pub to: Lane,
}

/// Result of recomputing lane/position for an owner's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    ordered: Vec<Task>,
    changes: Vec<PositionChange>,
    transition: Option<LaneTransition>,
}

impl Reconciliation {
    /// Returns the full resulting order, sorted by lane then position.
    #[must_use]
    pub fn ordered(&self) -> &[Task] {
        &self.ordered
    }

    /// Consumes the reconciliation, returning the resulting order.
    #[must_use]
    pub fn into_ordered(self) -> Vec<Task> {
        self.ordered
    }

    /// Returns the placements that differ from their pre-move values.
    #[must_use]
    pub fn changes(&self) -> &[PositionChange] {
        &self.changes
    }

    /// Returns the lane transition, when the moved task changed lane.
    #[must_use]
    pub const fn transition(&self) -> Option<LaneTransition> {
        self.transition
    }

    /// Returns `true` when nothing needs persisting.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the write set as `(id, patch)` pairs.
    #[must_use]
    pub fn write_set(&self) -> Vec<(TaskId, TaskPatch)> {
        self.changes
            .iter()
            .map(|change| (change.task_id, change.to_patch()))
            .collect()
    }
}

/// Per-lane working lists.
#[derive(Debug, Default)]
struct LaneBuckets {
    todo: Vec<Task>,
    in_progress: Vec<Task>,
    completed: Vec<Task>,
}

impl LaneBuckets {
    fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut buckets = Self::default();
        for task in tasks {
            buckets.lane_mut(task.lane()).push(task);
        }
        buckets
    }

    const fn lane_mut(&mut self, lane: Lane) -> &mut Vec<Task> {
        match lane {
            Lane::Todo => &mut self.todo,
            Lane::InProgress => &mut self.in_progress,
            Lane::Completed => &mut self.completed,
        }
    }

    fn renumber(&mut self, lane: Lane) {
        for (index, task) in self.lane_mut(lane).iter_mut().enumerate() {
            task.place(lane, Position::from_index(index));
        }
    }

    fn into_ordered(self) -> Vec<Task> {
        let mut ordered: Vec<Task> = self
            .todo
            .into_iter()
            .chain(self.in_progress)
            .chain(self.completed)
            .collect();
        sort_for_board(&mut ordered);
        ordered
    }
}

/// Sorts tasks by lane (todo, in progress, completed) then position.
///
/// The sort is stable, so tasks sharing a slot keep their relative order.
pub fn sort_for_board(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.lane(), task.position()));
}

/// Recomputes lane/position after moving one task.
///
/// Returns `None` when the move has no destination or the task is not in
/// `tasks`. Lane sequences are taken from `tasks` sorted by lane then
/// position; only the destination lane, and the source lane when the lane
/// changed, are renumbered.
#[must_use]
pub fn reconcile(tasks: &[Task], request: &MoveRequest) -> Option<Reconciliation> {
    let destination = request.destination?;
    let mut working = tasks.to_vec();
    sort_for_board(&mut working);
    let moved_index = working
        .iter()
        .position(|task| task.id() == request.task_id)?;
    let mut moved = working.remove(moved_index);
    let source_lane = moved.lane();
    let lane_changed = source_lane != destination.lane;

    moved.place(destination.lane, moved.position());
    let mut buckets = LaneBuckets::from_tasks(working);
    let dest = buckets.lane_mut(destination.lane);
    let insert_at = destination.index.min(dest.len());
    dest.insert(insert_at, moved);
    buckets.renumber(destination.lane);
    if lane_changed {
        buckets.renumber(source_lane);
    }

    let ordered = buckets.into_ordered();
    let changes = diff_placements(tasks, &ordered);
    let transition = lane_changed.then_some(LaneTransition {
        task_id: request.task_id,
        from: source_lane,
        to: destination.lane,
    });
    tracing::debug!(
        task_id = %request.task_id,
        from = %source_lane,
        to = %destination.lane,
        index = insert_at,
        changed = changes.len(),
        "reconciled task move"
    );

    Some(Reconciliation {
        ordered,
        changes,
        transition,
    })
}

/// Re-ranks every lane by due date.
///
/// Tasks without a due date sort last in either direction; ties keep their
/// current relative order. Every lane comes out dense.
#[must_use]
pub fn rank_by_due_date(tasks: &[Task], order: SortOrder) -> Reconciliation {
    let mut working = tasks.to_vec();
    sort_for_board(&mut working);
    let mut buckets = LaneBuckets::from_tasks(working);
    for lane in Lane::ALL {
        buckets
            .lane_mut(lane)
            .sort_by(|a, b| compare_due_dates(a.due_date(), b.due_date(), order));
        buckets.renumber(lane);
    }

    let ordered = buckets.into_ordered();
    let changes = diff_placements(tasks, &ordered);
    tracing::debug!(?order, changed = changes.len(), "ranked lanes by due date");
    Reconciliation {
        ordered,
        changes,
        transition: None,
    }
}

fn compare_due_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => match order {
            SortOrder::Ascending => left.cmp(&right),
            SortOrder::Descending => right.cmp(&left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn diff_placements(before: &[Task], after: &[Task]) -> Vec<PositionChange> {
    let previous: HashMap<TaskId, (Lane, Position, u64)> = before
        .iter()
        .map(|task| (task.id(), (task.lane(), task.position(), task.version())))
        .collect();

    after
        .iter()
        .filter_map(|task| {
            let &(previous_lane, previous_position, seen_version) = previous.get(&task.id())?;
            let unchanged = previous_lane == task.lane() && previous_position == task.position();
            (!unchanged).then_some(PositionChange {
                task_id: task.id(),
                lane: task.lane(),
                position: task.position(),
                previous_lane,
                previous_position,
                seen_version,
            })
        })
        .collect()
}
