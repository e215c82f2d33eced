//! Domain model for task tracking.
//!
//! The task domain models tasks, their lanes and positions, activity-log
//! entries, and the pure reorder engine, while keeping all infrastructure
//! concerns outside of the domain boundary.

mod activity;
mod board;
mod error;
mod ids;
mod lane;
pub mod reorder;
mod task;

pub use activity::{ActivityAction, ActivityLogEntry};
pub use board::BoardSnapshot;
pub use error::{ParseCategoryError, ParseLaneError, TaskDomainError};
pub use ids::{OwnerId, Position, TaskId};
pub use lane::{Category, Lane};
pub use reorder::{
    Destination, LaneTransition, MoveRequest, PositionChange, Reconciliation, SortOrder,
    rank_by_due_date, reconcile, sort_for_board,
};
pub use task::{NewTask, PersistedTaskData, Task, TaskDraft, TaskPatch};
