//! Then steps for task reordering BDD scenarios.

use super::world::{TaskWorld, parse_lane, run_async, split_names};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use tasklane::task::domain::Task;

fn lane_tasks(world: &TaskWorld, lane: &str) -> Result<Vec<Task>, eyre::Report> {
    let owner = world.owner()?;
    let target = parse_lane(lane)?;
    let snapshot = run_async(world.service.board(&owner)).wrap_err("load board")?;
    Ok(snapshot.lane(target).to_vec())
}

fn find_task(world: &TaskWorld, name: &str) -> Result<Task, eyre::Report> {
    let owner = world.owner()?;
    let task_id = world.task_id(name)?;
    let tasks = run_async(world.service.list_tasks(&owner)).wrap_err("list tasks")?;
    tasks
        .into_iter()
        .find(|task| task.id() == task_id)
        .ok_or_else(|| eyre::eyre!("task {name} is not on the board"))
}

#[then(r#"the "{lane}" lane reads "{names}""#)]
fn lane_reads(world: &TaskWorld, lane: String, names: String) -> Result<(), eyre::Report> {
    let tasks = lane_tasks(world, &lane)?;
    let actual: Vec<String> = tasks.iter().map(|task| task.text().to_owned()).collect();
    let expected = split_names(&names);
    eyre::ensure!(
        actual == expected,
        "expected {lane} lane {expected:?}, found {actual:?}"
    );

    let positions: Vec<u32> = tasks.iter().map(|task| task.position().value()).collect();
    let dense: Vec<u32> = (0..).take(positions.len()).collect();
    eyre::ensure!(
        positions == dense,
        "expected dense {lane} positions, found {positions:?}"
    );
    Ok(())
}

#[then(r#"the "{lane}" lane positions are "{positions}""#)]
fn lane_positions(
    world: &TaskWorld,
    lane: String,
    positions: String,
) -> Result<(), eyre::Report> {
    let actual: Vec<String> = lane_tasks(world, &lane)?
        .iter()
        .map(|task| task.position().to_string())
        .collect();
    let expected = split_names(&positions);
    eyre::ensure!(
        actual == expected,
        "expected {lane} positions {expected:?}, found {actual:?}"
    );
    Ok(())
}

#[then("no placement changes are reported")]
fn no_placement_changes(world: &TaskWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move outcome in scenario world"))?;
    let reconciliation = outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("move was ignored instead of reconciled"))?;
    eyre::ensure!(
        reconciliation.is_noop(),
        "expected no changes, found {}",
        reconciliation.changes().len()
    );
    Ok(())
}

#[then(r#"task "{name}" has the latest activity "{action}""#)]
fn latest_activity(world: &TaskWorld, name: String, action: String) -> Result<(), eyre::Report> {
    let task = find_task(world, &name)?;
    let latest = task
        .activity_log()
        .last()
        .ok_or_else(|| eyre::eyre!("task {name} has no activity"))?;
    eyre::ensure!(
        latest.action == action,
        "expected latest activity {action:?}, found {:?}",
        latest.action
    );
    Ok(())
}

#[then(r#"task "{name}" has {count:usize} activity entries"#)]
fn activity_count(world: &TaskWorld, name: String, count: usize) -> Result<(), eyre::Report> {
    let task = find_task(world, &name)?;
    let actual = task.activity_log().len();
    eyre::ensure!(
        actual == count,
        "expected {count} activity entries for {name}, found {actual}"
    );
    Ok(())
}

#[then(r#"task "{name}" sits at position {position:u32}"#)]
fn task_position(world: &TaskWorld, name: String, position: u32) -> Result<(), eyre::Report> {
    let task = find_task(world, &name)?;
    eyre::ensure!(
        task.position().value() == position,
        "expected {name} at position {position}, found {}",
        task.position()
    );
    Ok(())
}
