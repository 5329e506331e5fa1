//! Scheduler ticks against a live in-memory desk.

use super::helpers::build_desk;
use chrono::TimeDelta;
use eyre::{OptionExt, ensure};
use rstest::rstest;
use taskdesk::notification::domain::NotificationKind;
use taskdesk::task::{domain::TaskStatus, services::CreateTaskRequest};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn past_deadline_yields_overdue_and_one_sent_alert() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Submit invoice", desk.worker, 1).await?;
    desk.clock.advance(TimeDelta::hours(2));
    let scheduler = desk.scheduler();

    let first = scheduler.tick().await?;
    let second = scheduler.tick().await?;

    ensure!(first.marked_overdue == 1, "one task marked overdue");
    ensure!(second.is_idle(), "second tick finds nothing to do");
    let stored = desk.lifecycle.get_task(task.id(), desk.admin).await?;
    ensure!(stored.status() == TaskStatus::Overdue, "task is overdue");

    let alerts = desk
        .notifications_of(task.id(), NotificationKind::Deadline)
        .await?;
    ensure!(alerts.len() == 1, "exactly one deadline alert");
    let alert = alerts.first().ok_or_eyre("alert missing")?;
    ensure!(alert.is_sent(), "alert delivered");
    ensure!(alert.recipient_id() == desk.worker, "assignee alerted");

    let history = desk.lifecycle.task_history(task.id(), desk.admin).await?;
    let last = history.last().ok_or_eyre("history is empty")?;
    ensure!(last.actor().user_id().is_none(), "sweep acts as the system");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finished_tasks_are_left_alone_by_the_sweep() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Book venue", desk.worker, 1).await?;
    desk.lifecycle
        .change_status(task.id(), TaskStatus::Completed, desk.worker)
        .await?;
    desk.clock.advance(TimeDelta::hours(3));

    let report = desk.scheduler().tick().await?;

    ensure!(report.marked_overdue == 0, "completed tasks never become overdue");
    ensure!(
        desk.notifications_of(task.id(), NotificationKind::Deadline)
            .await?
            .is_empty(),
        "no alert for finished work"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_task_without_alert_is_alerted_after_restart() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Call supplier", desk.worker, 1).await?;
    desk.clock.advance(TimeDelta::hours(2));
    desk.lifecycle
        .force_status(task.id(), TaskStatus::Overdue, desk.admin)
        .await?;

    let report = desk.scheduler().tick().await?;

    ensure!(report.marked_overdue == 0, "status already overdue");
    ensure!(report.deadline_alerts == 1, "missing alert is created");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reminder_is_planned_once_and_delivered_when_due() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let request = CreateTaskRequest::new("Prepare slides")
        .with_deadline(desk.in_hours(6) + TimeDelta::minutes(30))
        .with_assignee(desk.worker);
    let task = desk.lifecycle.create_task(request, desk.admin).await?;
    desk.settle().await;
    let scheduler = desk.scheduler();

    let planned = scheduler.tick().await?;
    let repeated = scheduler.tick().await?;
    ensure!(planned.reminders_scheduled == 1, "six-hour reminder planned");
    ensure!(repeated.reminders_scheduled == 0, "unsent reminder is not duplicated");

    desk.clock.advance(TimeDelta::hours(1));
    let drained = scheduler.tick().await?;
    ensure!(drained.delivered == 1, "due reminder delivered");

    let reminders = desk
        .notifications_of(task.id(), NotificationKind::Reminder)
        .await?;
    ensure!(reminders.len() == 1, "one reminder stored");
    let reminder = reminders.first().ok_or_eyre("reminder missing")?;
    ensure!(reminder.lead_hours() == Some(6), "lead time recorded");
    ensure!(reminder.is_sent(), "reminder marked sent");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_alert_is_retried_on_a_later_tick() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let task = desk.assigned_task("Pay rent", desk.worker, 1).await?;
    desk.dispatcher.set_unreachable(desk.worker);
    desk.clock.advance(TimeDelta::hours(2));
    let scheduler = desk.scheduler();

    let failed = scheduler.tick().await?;
    ensure!(failed.deadline_alerts == 1, "alert stored despite the failure");
    ensure!(failed.failed == 1, "first attempt fails");

    desk.dispatcher.restore(desk.worker);
    let retried = scheduler.tick().await?;
    ensure!(retried.deadline_alerts == 0, "alert is not recreated");
    ensure!(retried.delivered == 1, "stored alert delivered on retry");

    let alerts = desk
        .notifications_of(task.id(), NotificationKind::Deadline)
        .await?;
    ensure!(alerts.len() == 1, "still one alert");
    ensure!(alerts.iter().all(|alert| alert.is_sent()), "alert now sent");
    Ok(())
}
