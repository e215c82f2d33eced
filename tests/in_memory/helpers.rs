//! Shared test helpers for in-memory store integration tests.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::fixture;
use tasklane::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Lane, OwnerId, Task},
    services::{TaskBoardService, TaskRequest},
};

/// Board service over the in-memory store.
pub type MemoryBoard = TaskBoardService<InMemoryTaskStore, DefaultClock>;

/// Provides a board service over a fresh store.
#[fixture]
pub fn board() -> MemoryBoard {
    TaskBoardService::new(Arc::new(InMemoryTaskStore::new()), Arc::new(DefaultClock))
}

/// Provides the default test owner.
#[fixture]
pub fn owner() -> OwnerId {
    OwnerId::new("alice").expect("valid owner")
}

/// Returns a fixed due date in November 2026.
#[must_use]
pub fn due(day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, 11, day)
}

/// Creates one todo task per entry of `texts`, in order.
///
/// # Errors
///
/// Returns an error if any creation fails.
pub async fn create_all(
    board: &MemoryBoard,
    owner: &OwnerId,
    texts: &[&str],
) -> Result<Vec<Task>, eyre::Report> {
    let mut created = Vec::with_capacity(texts.len());
    for text in texts {
        created.push(board.create_task(owner, TaskRequest::new(*text, due(1))).await?);
    }
    Ok(created)
}

/// Returns the texts of `lane` in board order.
///
/// # Errors
///
/// Returns an error if the board cannot be loaded.
pub async fn lane_texts(
    board: &MemoryBoard,
    owner: &OwnerId,
    lane: Lane,
) -> Result<Vec<String>, eyre::Report> {
    let snapshot = board.board(owner).await?;
    Ok(snapshot
        .lane(lane)
        .iter()
        .map(|task| task.text().to_owned())
        .collect())
}

/// Asserts every lane of the owner's board is numbered `0..n-1`.
///
/// # Errors
///
/// Returns an error if the board cannot be loaded or a lane is not dense.
pub async fn ensure_dense(board: &MemoryBoard, owner: &OwnerId) -> Result<(), eyre::Report> {
    let snapshot = board.board(owner).await?;
    for lane in Lane::ALL {
        let positions: Vec<u32> = snapshot
            .lane(lane)
            .iter()
            .map(|task| task.position().value())
            .collect();
        let expected: Vec<u32> = (0..).take(positions.len()).collect();
        eyre::ensure!(
            positions == expected,
            "lane {lane} is not dense: {positions:?}"
        );
    }
    Ok(())
}
