//! Notification repository tests against `PostgreSQL`.

use crate::postgres::helpers::{PgContext, pg_context};
use crate::test_helpers::base_instant;
use chrono::{DateTime, TimeDelta, Utc};
use rstest::rstest;
use taskdesk::notification::{
    domain::{DedupKey, DedupScope, NewNotification, Notification, NotificationId, NotificationKind},
    ports::{NotificationRepository, NotificationRepositoryError},
};
use taskdesk::task::{
    domain::{
        Actor, HistoryAction, NewTask, Task, TaskHistoryEntry, TaskId, TaskPriority, TaskTitle,
        TextLimits,
    },
    ports::TaskRepository,
};

fn stored_task(context: &PgContext) -> TaskId {
    let task = Task::create(
        NewTask {
            title: TaskTitle::new("Inventory count", TextLimits::default()).expect("valid title"),
            description: None,
            creator_id: context.admin,
            assignee_id: Some(context.worker),
            priority: TaskPriority::High,
            deadline: Some(base_instant() + TimeDelta::days(1)),
        },
        &context.clock,
    );
    let entry = TaskHistoryEntry::new(
        task.id(),
        Actor::User(context.admin),
        HistoryAction::Created,
        task.created_at(),
    );
    context
        .rt
        .block_on(context.tasks.create(&task, &entry))
        .expect("task create");
    task.id()
}

fn notice(
    context: &PgContext,
    task_id: TaskId,
    kind: NotificationKind,
    lead_hours: Option<u32>,
    scheduled_at: DateTime<Utc>,
) -> Notification {
    Notification::schedule(
        NewNotification {
            recipient_id: context.worker,
            task_id,
            kind,
            lead_hours,
            message: format!("{} notice", kind.as_str()),
            scheduled_at,
        },
        &context.clock,
    )
}

fn save(context: &PgContext, notification: &Notification) {
    context
        .rt
        .block_on(context.notifications.create(notification))
        .expect("notification create");
}

fn exists(context: &PgContext, key: DedupKey, scope: DedupScope) -> bool {
    context
        .rt
        .block_on(context.notifications.exists(key, scope))
        .expect("dedup lookup")
}

#[rstest]
fn deadline_alert_dedups_for_its_lifetime(pg_context: PgContext) {
    let context = pg_context;
    let task_id = stored_task(&context);
    let alert = notice(&context, task_id, NotificationKind::Deadline, None, base_instant());
    save(&context, &alert);
    context
        .rt
        .block_on(context.notifications.mark_sent(alert.id(), base_instant()))
        .expect("mark sent");

    let key = DedupKey::deadline(task_id);
    assert!(exists(&context, key, DedupScope::Lifetime));
    assert!(!exists(&context, key, DedupScope::Unsent));
    assert!(
        !exists(&context, DedupKey::reminder(task_id, 24), DedupScope::Lifetime),
        "a deadline alert is not a reminder"
    );
    context.cleanup();
}

#[rstest]
fn reminder_dedups_only_while_unsent(pg_context: PgContext) {
    let context = pg_context;
    let task_id = stored_task(&context);
    let reminder = notice(&context, task_id, NotificationKind::Reminder, Some(24), base_instant());
    save(&context, &reminder);

    let key = DedupKey::reminder(task_id, 24);
    assert!(exists(&context, key, DedupScope::Unsent));
    assert!(
        !exists(&context, DedupKey::reminder(task_id, 1), DedupScope::Unsent),
        "other lead hours are separate keys"
    );
    assert!(
        !exists(&context, DedupKey::deadline(task_id), DedupScope::Unsent),
        "a null lead hour only matches deadline alerts"
    );

    context
        .rt
        .block_on(context.notifications.mark_sent(reminder.id(), base_instant()))
        .expect("mark sent");
    assert!(!exists(&context, key, DedupScope::Unsent));
    assert!(exists(&context, key, DedupScope::Lifetime));
    context.cleanup();
}

#[rstest]
fn pending_lists_due_unsent_in_schedule_order(pg_context: PgContext) {
    let context = pg_context;
    let task_id = stored_task(&context);
    let later = notice(
        &context,
        task_id,
        NotificationKind::Reminder,
        Some(1),
        base_instant() + TimeDelta::minutes(10),
    );
    let earlier = notice(&context, task_id, NotificationKind::Deadline, None, base_instant());
    let future = notice(
        &context,
        task_id,
        NotificationKind::Reminder,
        Some(24),
        base_instant() + TimeDelta::hours(5),
    );
    for notification in [&later, &earlier, &future] {
        save(&context, notification);
    }

    let pending = context
        .rt
        .block_on(
            context
                .notifications
                .list_pending(base_instant() + TimeDelta::minutes(10)),
        )
        .expect("pending listing");

    assert_eq!(
        pending.iter().map(Notification::id).collect::<Vec<_>>(),
        vec![earlier.id(), later.id()]
    );
    context.cleanup();
}

#[rstest]
fn mark_sent_reports_unknown_and_repeated_delivery(pg_context: PgContext) {
    let context = pg_context;
    let task_id = stored_task(&context);
    let alert = notice(&context, task_id, NotificationKind::Deadline, None, base_instant());
    save(&context, &alert);
    context
        .rt
        .block_on(context.notifications.mark_sent(alert.id(), base_instant()))
        .expect("first delivery");

    let repeated = context
        .rt
        .block_on(context.notifications.mark_sent(alert.id(), base_instant()));
    let unknown = NotificationId::new();
    let missing = context
        .rt
        .block_on(context.notifications.mark_sent(unknown, base_instant()));

    assert!(
        matches!(repeated, Err(NotificationRepositoryError::AlreadySent(id)) if id == alert.id()),
        "expected already sent, got {repeated:?}"
    );
    assert!(
        matches!(missing, Err(NotificationRepositoryError::NotFound(id)) if id == unknown),
        "expected not found, got {missing:?}"
    );
    context.cleanup();
}

#[rstest]
fn discard_removes_only_unsent_notifications(pg_context: PgContext) {
    let context = pg_context;
    let task_id = stored_task(&context);
    let pending = notice(&context, task_id, NotificationKind::Reminder, Some(24), base_instant());
    let delivered = notice(&context, task_id, NotificationKind::Deadline, None, base_instant());
    save(&context, &pending);
    save(&context, &delivered);
    context
        .rt
        .block_on(context.notifications.mark_sent(delivered.id(), base_instant()))
        .expect("mark sent");

    context
        .rt
        .block_on(context.notifications.discard(pending.id()))
        .expect("discard pending");
    let kept = context
        .rt
        .block_on(context.notifications.discard(delivered.id()));
    let remaining = context
        .rt
        .block_on(context.notifications.list_for_task(task_id))
        .expect("task listing");

    assert!(
        matches!(kept, Err(NotificationRepositoryError::AlreadySent(id)) if id == delivered.id()),
        "expected already sent, got {kept:?}"
    );
    assert_eq!(
        remaining.iter().map(Notification::id).collect::<Vec<_>>(),
        vec![delivered.id()]
    );
    context.cleanup();
}
