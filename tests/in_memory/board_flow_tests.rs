//! Board flows through the task board service over the in-memory store.

use crate::in_memory::helpers::{
    MemoryBoard, board, create_all, due, ensure_dense, lane_texts, owner,
};
use rstest::rstest;
use tasklane::task::{
    domain::{Lane, MoveRequest, OwnerId, SortOrder},
    services::{InvalidationReason, TaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn drag_sequence_keeps_every_lane_dense(
    board: MemoryBoard,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let tasks = create_all(&board, &owner, &["A", "B", "C", "D", "E"]).await?;
    let id = |index: usize| tasks.get(index).map(|task| task.id());
    let moves = [
        (4, Lane::InProgress, 0),
        (0, Lane::InProgress, 0),
        (2, Lane::Completed, 5),
        (1, Lane::InProgress, 1),
        (4, Lane::Todo, 0),
        (0, Lane::InProgress, 99),
    ];

    for (index, lane, slot) in moves {
        let task_id = id(index).ok_or_else(|| eyre::eyre!("no task at {index}"))?;
        board
            .move_task(&owner, MoveRequest::new(task_id, lane, slot))
            .await?;
        ensure_dense(&board, &owner).await?;
    }

    assert_eq!(lane_texts(&board, &owner, Lane::Todo).await?, ["E", "D"]);
    assert_eq!(lane_texts(&board, &owner, Lane::InProgress).await?, ["B", "A"]);
    assert_eq!(lane_texts(&board, &owner, Lane::Completed).await?, ["C"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeating_a_move_is_idempotent(
    board: MemoryBoard,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let tasks = create_all(&board, &owner, &["A", "B", "C"]).await?;
    let moved = tasks
        .last()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("no tasks created"))?;
    let request = MoveRequest::new(moved, Lane::InProgress, 0);

    board.move_task(&owner, request).await?;
    let repeated = board
        .move_task(&owner, request)
        .await?
        .ok_or_else(|| eyre::eyre!("task should still be movable"))?;

    assert!(repeated.is_noop());
    let log = board.activity(&owner, moved).await?;
    assert_eq!(log.len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn services_sharing_a_feed_publish_every_mutation(
    board: MemoryBoard,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let mut signals = board.feed().subscribe();
    let created = board
        .create_task(&owner, TaskRequest::new("Inbox zero", due(9)))
        .await?;
    board
        .edit_task(&owner, created.id(), TaskRequest::new("Inbox zero!", due(9)))
        .await?;
    board.sort_by_due_date(&owner, SortOrder::Descending).await?;
    board.delete_task(&owner, created.id()).await?;

    let mut reasons = Vec::new();
    while let Ok(signal) = signals.try_recv() {
        eyre::ensure!(signal.owner == owner, "signal for another owner");
        reasons.push(signal.reason);
    }
    assert_eq!(
        reasons,
        vec![
            InvalidationReason::TaskCreated(created.id()),
            InvalidationReason::TaskEdited(created.id()),
            InvalidationReason::TaskDeleted(created.id()),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn owners_never_see_each_others_tasks(board: MemoryBoard) -> Result<(), eyre::Report> {
    let alice = OwnerId::new("alice")?;
    let bob = OwnerId::new("bob")?;
    create_all(&board, &alice, &["alice task"]).await?;
    let theirs = create_all(&board, &bob, &["bob task"]).await?;
    let bob_task = theirs
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("no task created"))?;

    assert_eq!(board.list_tasks(&alice).await?.len(), 1);
    assert!(board.activity(&alice, bob_task).await?.is_empty());
    assert!(!board.delete_task(&alice, bob_task).await?);
    assert_eq!(lane_texts(&board, &bob, Lane::Todo).await?, ["bob task"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sorting_then_dragging_keeps_lanes_dense(
    board: MemoryBoard,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    for (text, day) in [("third", 20), ("first", 3), ("second", 11)] {
        board
            .create_task(&owner, TaskRequest::new(text, due(day)))
            .await?;
    }

    board.sort_by_due_date(&owner, SortOrder::Ascending).await?;
    assert_eq!(
        lane_texts(&board, &owner, Lane::Todo).await?,
        ["first", "second", "third"]
    );

    let tasks = board.list_tasks(&owner).await?;
    let last = tasks
        .last()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("no tasks listed"))?;
    board
        .move_task(&owner, MoveRequest::new(last, Lane::Todo, 0))
        .await?;
    ensure_dense(&board, &owner).await?;
    assert_eq!(
        lane_texts(&board, &owner, Lane::Todo).await?,
        ["third", "first", "second"]
    );
    Ok(())
}
