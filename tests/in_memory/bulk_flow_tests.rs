//! Bulk action flows against a store shared with the board service.

use crate::in_memory::helpers::{MemoryBoard, board, create_all, ensure_dense, lane_texts, owner};
use rstest::rstest;
use tasklane::task::{
    domain::{Lane, MoveRequest, OwnerId},
    services::{BulkActionConfig, BulkActionError, TaskSelection},
};

#[rstest]
#[case::sequential(BulkActionConfig::sequential())]
#[case::concurrent(BulkActionConfig::default())]
#[tokio::test(flavor = "multi_thread")]
async fn complete_all_preserves_selection_order(
    board: MemoryBoard,
    owner: OwnerId,
    #[case] config: BulkActionConfig,
) -> Result<(), eyre::Report> {
    let tasks = create_all(&board, &owner, &["A", "B", "C", "D"]).await?;
    let mut selection: TaskSelection = tasks.iter().rev().map(|task| task.id()).collect();

    let report = board
        .bulk_actions(config)
        .complete_all(&owner, &mut selection)
        .await?;

    assert!(report.is_success());
    assert_eq!(report.applied.len(), 4);
    assert_eq!(
        lane_texts(&board, &owner, Lane::Completed).await?,
        ["D", "C", "B", "A"]
    );
    ensure_dense(&board, &owner).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_all_gaps_are_compacted_by_next_move(
    board: MemoryBoard,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let tasks = create_all(&board, &owner, &["A", "B", "C", "D"]).await?;
    let mut selection = TaskSelection::new();
    for task in tasks.iter().filter(|candidate| matches!(candidate.text(), "A" | "C")) {
        selection.toggle(task.id());
    }

    let report = board
        .bulk_actions(BulkActionConfig::default())
        .delete_all(&owner, &mut selection)
        .await?;
    assert_eq!(report.applied.len(), 2);
    assert!(ensure_dense(&board, &owner).await.is_err());

    let last = tasks
        .last()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("no tasks created"))?;
    board
        .move_task(&owner, MoveRequest::new(last, Lane::Todo, 0))
        .await?;
    ensure_dense(&board, &owner).await?;
    assert_eq!(lane_texts(&board, &owner, Lane::Todo).await?, ["D", "B"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_selection_is_rejected(board: MemoryBoard, owner: OwnerId) {
    let mut selection = TaskSelection::new();

    let result = board
        .bulk_actions(BulkActionConfig::default())
        .delete_all(&owner, &mut selection)
        .await;

    assert!(matches!(result, Err(BulkActionError::EmptySelection)));
}
