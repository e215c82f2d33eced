//! Application services for task tracking.

mod activity;
mod board;
mod bulk;
mod commit;
mod invalidation;

pub use activity::ActivityLog;
pub use board::{TaskBoardError, TaskBoardResult, TaskBoardService, TaskRequest};
pub use bulk::{
    BulkAction, BulkActionConfig, BulkActionCoordinator, BulkActionError, BulkReport,
    TaskSelection,
};
pub use commit::{BatchCommitter, CommitReport};
pub use invalidation::{BoardInvalidation, InvalidationFeed, InvalidationReason};
