//! When steps for task reordering BDD scenarios.

use super::world::{TaskWorld, parse_lane, run_async, split_names};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use tasklane::task::{
    domain::MoveRequest,
    services::{BulkActionConfig, TaskRequest, TaskSelection},
};

#[when(r#"task "{name}" is moved to the "{lane}" lane at index {index:usize}"#)]
fn move_task(
    world: &mut TaskWorld,
    name: String,
    lane: String,
    index: usize,
) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let task_id = world.task_id(&name)?;
    let request = MoveRequest::new(task_id, parse_lane(&lane)?, index);

    let outcome = run_async(world.service.move_task(&owner, request)).wrap_err("move task")?;
    world.last_move = Some(outcome);
    Ok(())
}

#[when(r#"task "{name}" is deleted"#)]
fn delete_task(world: &mut TaskWorld, name: String) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let task_id = world.task_id(&name)?;

    let deleted = run_async(world.service.delete_task(&owner, task_id)).wrap_err("delete task")?;
    eyre::ensure!(deleted, "task {name} was not deleted");
    Ok(())
}

#[when(r#"a task "{name}" is created in the "{lane}" lane"#)]
fn create_task_in_lane(
    world: &mut TaskWorld,
    name: String,
    lane: String,
) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let request = TaskRequest::new(name.as_str(), NaiveDate::from_ymd_opt(2026, 11, 2))
        .with_lane(parse_lane(&lane)?);

    let created =
        run_async(world.service.create_task(&owner, request)).wrap_err("create task")?;
    world.tasks_by_name.insert(name, created.id());
    Ok(())
}

#[when(r#"the selected tasks "{names}" are completed"#)]
fn complete_selection(world: &mut TaskWorld, names: String) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let mut selection = TaskSelection::new();
    for name in split_names(&names) {
        selection.select(world.task_id(&name)?);
    }

    let coordinator = world.service.bulk_actions(BulkActionConfig::default());
    let report = run_async(coordinator.complete_all(&owner, &mut selection))
        .wrap_err("complete selection")?;
    eyre::ensure!(report.is_success(), "bulk complete reported failures");
    eyre::ensure!(selection.is_empty(), "selection was not cleared");
    Ok(())
}
