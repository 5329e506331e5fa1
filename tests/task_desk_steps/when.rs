//! When steps for task desk BDD scenarios.

use super::world::{DeskWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskdesk::task::{
    domain::{Task, TaskStatus},
    services::TaskLifecycleError,
};

fn record(world: &mut DeskWorld, result: Result<Task, TaskLifecycleError>) {
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
}

#[when(r#""{actor}" moves the task to "{status}""#)]
fn move_task(world: &mut DeskWorld, actor: String, status: String) -> Result<(), eyre::Report> {
    let actor_id = world.user_named(&actor)?;
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let result = run_async(world.desk.lifecycle.change_status(task_id, target, actor_id));
    record(world, result);
    Ok(())
}

#[when(r#""{actor}" cancels the task"#)]
fn cancel_task(world: &mut DeskWorld, actor: String) -> Result<(), eyre::Report> {
    let actor_id = world.user_named(&actor)?;
    let task_id = world.task()?.id();
    let result = run_async(world.desk.lifecycle.cancel(task_id, actor_id));
    record(world, result);
    Ok(())
}

#[when(r#""{actor}" reassigns the task to "{assignee}""#)]
fn reassign_task(world: &mut DeskWorld, actor: String, assignee: String) -> Result<(), eyre::Report> {
    let actor_id = world.user_named(&actor)?;
    let assignee_id = world.user_named(&assignee)?;
    let task_id = world.task()?.id();
    let result = run_async(world.desk.lifecycle.reassign(task_id, assignee_id, actor_id));
    record(world, result);
    Ok(())
}

#[when("the scheduler ticks")]
fn scheduler_ticks(world: &mut DeskWorld) -> Result<(), eyre::Report> {
    run_async(world.desk.settle());
    run_async(world.scheduler.tick()).wrap_err("scheduler tick")?;
    Ok(())
}
