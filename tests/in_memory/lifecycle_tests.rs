//! End-to-end lifecycle flows through the in-memory desk.

use super::helpers::build_desk;
use eyre::{OptionExt, ensure};
use rstest::rstest;
use taskdesk::notification::domain::NotificationKind;
use taskdesk::task::{
    domain::{Actor, HistoryAction, TaskPriority, TaskStatus},
    services::{CreateTaskRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_drives_assigned_task_to_completion() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Prepare quarterly report", desk.worker, 48).await?;
    ensure!(task.status() == TaskStatus::New, "new tasks start as New");
    ensure!(
        desk.lifecycle.task_history(task.id(), desk.admin).await?.len() == 1,
        "creation records one entry"
    );

    desk.lifecycle
        .change_status(task.id(), TaskStatus::InProgress, desk.worker)
        .await?;
    ensure!(
        desk.lifecycle.task_history(task.id(), desk.admin).await?.len() == 2,
        "starting work records a second entry"
    );

    let done = desk
        .lifecycle
        .change_status(task.id(), TaskStatus::Completed, desk.worker)
        .await?;
    let history = desk.lifecycle.task_history(task.id(), desk.worker).await?;
    ensure!(history.len() == 3, "completion records a third entry");
    ensure!(done.completed_at().is_some(), "completed tasks carry completed_at");

    let last = history.last().ok_or_eyre("history is empty")?;
    ensure!(last.action() == HistoryAction::StatusChanged, "last entry is a status change");
    ensure!(last.actor() == Actor::User(desk.worker), "worker is the recorded actor");
    ensure!(last.old_value() == Some("in_progress"), "old status recorded");
    ensure!(last.new_value() == Some("completed"), "new status recorded");

    let completed = desk
        .notifications_of(task.id(), NotificationKind::Completed)
        .await?;
    ensure!(completed.len() == 1, "creator hears about the completion");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_at_is_cleared_when_an_admin_reopens() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Renew certificates", desk.worker, 24).await?;
    desk.lifecycle
        .change_status(task.id(), TaskStatus::Completed, desk.worker)
        .await?;

    let reopened = desk
        .lifecycle
        .force_status(task.id(), TaskStatus::InProgress, desk.admin)
        .await?;

    ensure!(reopened.status() == TaskStatus::InProgress, "status forced back");
    ensure!(reopened.completed_at().is_none(), "completed_at only while completed");
    let history = desk.lifecycle.task_history(task.id(), desk.admin).await?;
    let last = history.last().ok_or_eyre("history is empty")?;
    ensure!(last.action() == HistoryAction::StatusForced, "override is recorded as forced");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workers_are_refused_admin_operations() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Rotate keys", desk.worker, 24).await?;

    let create = desk
        .lifecycle
        .create_task(CreateTaskRequest::new("Sneaky task"), desk.worker)
        .await;
    ensure!(
        matches!(create, Err(TaskLifecycleError::Forbidden { .. })),
        "workers cannot create tasks"
    );
    let cancel = desk.lifecycle.cancel(task.id(), desk.worker).await;
    ensure!(
        matches!(cancel, Err(TaskLifecycleError::Forbidden { .. })),
        "workers cannot cancel"
    );
    let reassign = desk
        .lifecycle
        .reassign(task.id(), desk.other_worker, desk.worker)
        .await;
    ensure!(
        matches!(reassign, Err(TaskLifecycleError::Forbidden { .. })),
        "workers cannot reassign"
    );
    let foreign = desk
        .lifecycle
        .change_status(task.id(), TaskStatus::InProgress, desk.other_worker)
        .await;
    ensure!(
        matches!(foreign, Err(TaskLifecycleError::Forbidden { .. })),
        "workers cannot move other people's tasks"
    );
    let listing = desk.lifecycle.list_all_tasks(desk.worker, None).await;
    ensure!(
        matches!(listing, Err(TaskLifecycleError::Forbidden { .. })),
        "workers cannot list every task"
    );

    ensure!(
        desk.lifecycle.task_history(task.id(), desk.admin).await?.len() == 1,
        "refused operations leave no history"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_twice_records_one_entry() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Order supplies", desk.worker, 24).await?;

    let first = desk.lifecycle.cancel(task.id(), desk.admin).await?;
    let second = desk.lifecycle.cancel(task.id(), desk.admin).await?;

    ensure!(first.status() == TaskStatus::Cancelled, "first cancel applies");
    ensure!(second.status() == TaskStatus::Cancelled, "second cancel is accepted");
    ensure!(
        desk.lifecycle.task_history(task.id(), desk.admin).await?.len() == 2,
        "only the first cancel is recorded"
    );
    Ok(())
}

#[rstest]
#[case(TaskStatus::Completed, TaskStatus::InProgress)]
#[case(TaskStatus::Cancelled, TaskStatus::New)]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_statuses_refuse_ordinary_moves(
    #[case] terminal: TaskStatus,
    #[case] target: TaskStatus,
) -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Archive mail", desk.worker, 24).await?;
    desk.lifecycle.force_status(task.id(), terminal, desk.admin).await?;

    let result = desk.lifecycle.change_status(task.id(), target, desk.admin).await;

    ensure!(
        matches!(result, Err(TaskLifecycleError::Domain(_))),
        "{terminal} must not move to {target}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassignment_notifies_the_new_assignee() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Draft contract", desk.worker, 24).await?;

    let moved = desk
        .lifecycle
        .reassign(task.id(), desk.other_worker, desk.admin)
        .await?;
    desk.settle().await;

    ensure!(moved.assignee_id() == Some(desk.other_worker), "assignee replaced");
    ensure!(
        desk.dispatcher.delivered_to(desk.other_worker).len() == 1,
        "new assignee is told"
    );
    let mine = desk.lifecycle.list_my_tasks(desk.other_worker, None).await?;
    ensure!(mine.len() == 1, "task shows up in the new assignee's list");
    let history = desk.lifecycle.task_history(task.id(), desk.admin).await?;
    let last = history.last().ok_or_eyre("history is empty")?;
    ensure!(last.action() == HistoryAction::Assigned, "reassignment recorded");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loose_edits_apply_valid_fields_and_report_the_rest() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Plan offsite", desk.worker, 72).await?;

    let outcome = desk
        .lifecycle
        .update_fields_from_pairs(
            task.id(),
            [("priority", "high"), ("colour", "blue"), ("deadline", "someday")],
            desk.admin,
        )
        .await?;

    ensure!(outcome.task.priority() == TaskPriority::High, "priority applied");
    ensure!(outcome.task.deadline() == task.deadline(), "bad deadline ignored");
    ensure!(outcome.rejected.len() == 2, "two edits rejected");
    Ok(())
}
