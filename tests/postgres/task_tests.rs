//! Task repository tests against `PostgreSQL`.

use crate::postgres::helpers::{PgContext, pg_context};
use crate::test_helpers::base_instant;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rstest::rstest;
use taskdesk::task::{
    domain::{
        Actor, HistoryAction, NewTask, PersistedTaskData, Task, TaskHistoryEntry, TaskPriority,
        TaskStatus, TaskTitle, TextLimits,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError},
};
use taskdesk::user::domain::UserId;

fn build_task(
    context: &PgContext,
    title: &str,
    deadline: Option<DateTime<Utc>>,
) -> Task {
    Task::create(
        NewTask {
            title: TaskTitle::new(title, TextLimits::default()).expect("valid title"),
            description: None,
            creator_id: context.admin,
            assignee_id: Some(context.worker),
            priority: TaskPriority::Medium,
            deadline,
        },
        &context.clock,
    )
}

fn created_entry(task: &Task) -> TaskHistoryEntry {
    TaskHistoryEntry::new(
        task.id(),
        Actor::User(task.creator_id()),
        HistoryAction::Created,
        task.created_at(),
    )
}

fn status_entry(task: &Task, actor: Actor, old: TaskStatus) -> TaskHistoryEntry {
    TaskHistoryEntry::new(task.id(), actor, HistoryAction::StatusChanged, task.updated_at())
        .with_old_value(Some(old.as_str().to_owned()))
        .with_new_value(Some(task.status().as_str().to_owned()))
}

fn store(context: &PgContext, task: &Task) {
    context
        .rt
        .block_on(context.tasks.create(task, &created_entry(task)))
        .expect("task create");
}

#[rstest]
fn created_task_round_trips_with_history(pg_context: PgContext) {
    let context = pg_context;
    let task = build_task(&context, "Order chairs", Some(base_instant() + TimeDelta::days(2)));
    store(&context, &task);

    let stored = context
        .rt
        .block_on(context.tasks.find_by_id(task.id()))
        .expect("lookup");
    let history = context
        .rt
        .block_on(context.tasks.list_history(task.id()))
        .expect("history");

    assert_eq!(stored.as_ref(), Some(&task));
    assert_eq!(
        history.iter().map(TaskHistoryEntry::action).collect::<Vec<_>>(),
        vec![HistoryAction::Created]
    );
    context.cleanup();
}

#[rstest]
fn stale_revision_is_a_conflict(pg_context: PgContext) {
    let context = pg_context;
    let original = build_task(&context, "Order chairs", None);
    store(&context, &original);

    let mut first = original.clone();
    let mut second = original;
    let worker = Actor::User(context.worker);
    let first_old = first
        .transition_to(TaskStatus::InProgress, &context.clock)
        .expect("valid transition");
    context
        .rt
        .block_on(
            context
                .tasks
                .update_status(&first, &status_entry(&first, worker, first_old)),
        )
        .expect("first update");

    let second_old = second
        .transition_to(TaskStatus::Completed, &context.clock)
        .expect("valid transition");
    let result = context.rt.block_on(
        context
            .tasks
            .update_status(&second, &status_entry(&second, worker, second_old)),
    );

    assert!(
        matches!(
            result,
            Err(TaskRepositoryError::Conflict { task_id, stored: 2, submitted: 2 })
                if task_id == first.id()
        ),
        "expected conflict, got {result:?}"
    );
    let stored = context
        .rt
        .block_on(context.tasks.find_by_id(first.id()))
        .expect("lookup")
        .expect("task present");
    assert_eq!(stored.status(), TaskStatus::InProgress);
    let history = context
        .rt
        .block_on(context.tasks.list_history(first.id()))
        .expect("history");
    assert_eq!(history.len(), 2, "rejected update must not append history");
    context.cleanup();
}

#[rstest]
fn failed_history_insert_rolls_back_the_status_change(pg_context: PgContext) {
    let context = pg_context;
    let mut task = build_task(&context, "Order chairs", None);
    store(&context, &task);

    let old = task
        .transition_to(TaskStatus::InProgress, &context.clock)
        .expect("valid transition");
    let unknown_actor = Actor::User(UserId::new());
    let result = context
        .rt
        .block_on(context.tasks.update_status(&task, &status_entry(&task, unknown_actor, old)));

    assert!(
        matches!(result, Err(TaskRepositoryError::Persistence(_))),
        "history foreign key should fail, got {result:?}"
    );
    let stored = context
        .rt
        .block_on(context.tasks.find_by_id(task.id()))
        .expect("lookup")
        .expect("task present");
    assert_eq!(stored.status(), TaskStatus::New);
    assert_eq!(stored.revision(), 1);
    let history = context
        .rt
        .block_on(context.tasks.list_history(task.id()))
        .expect("history");
    assert_eq!(history.len(), 1);
    context.cleanup();
}

#[rstest]
fn completed_task_without_completion_time_is_rejected(pg_context: PgContext) {
    let context = pg_context;
    let draft = build_task(&context, "Order chairs", None);
    let inconsistent = Task::from_persisted(PersistedTaskData {
        id: draft.id(),
        title: draft.title().clone(),
        description: None,
        creator_id: context.admin,
        assignee_id: Some(context.worker),
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        deadline: None,
        created_at: context.clock.utc(),
        updated_at: context.clock.utc(),
        completed_at: None,
        revision: 1,
    });

    let result = context
        .rt
        .block_on(context.tasks.create(&inconsistent, &created_entry(&inconsistent)));

    assert!(
        matches!(result, Err(TaskRepositoryError::Persistence(_))),
        "check constraint should reject the row, got {result:?}"
    );
    let stored = context
        .rt
        .block_on(context.tasks.find_by_id(inconsistent.id()))
        .expect("lookup");
    assert!(stored.is_none());
    let history = context
        .rt
        .block_on(context.tasks.list_history(inconsistent.id()))
        .expect("history");
    assert!(history.is_empty(), "history insert must roll back with the task");
    context.cleanup();
}

#[rstest]
#[case("50%", &["50% off"])]
#[case("a_b", &["a_b label"])]
fn search_treats_wildcards_literally(
    pg_context: PgContext,
    #[case] text: &str,
    #[case] expected: &[&str],
) {
    let context = pg_context;
    for title in ["50% off", "500 units", "a_b label", "axb label"] {
        store(&context, &build_task(&context, title, None));
    }

    let found = context
        .rt
        .block_on(context.tasks.search(&TaskQuery::new().with_text(text)))
        .expect("search");

    let titles: Vec<&str> = found.iter().map(|task| task.title().as_str()).collect();
    assert_eq!(titles, expected);
    context.cleanup();
}

#[rstest]
fn past_deadline_listing_skips_terminal_and_future_tasks(pg_context: PgContext) {
    let context = pg_context;
    let yesterday = Some(base_instant() - TimeDelta::days(1));
    let open = build_task(&context, "Open", yesterday);
    let mut done = build_task(&context, "Done", yesterday);
    let upcoming = build_task(&context, "Upcoming", Some(base_instant() + TimeDelta::days(1)));
    for task in [&open, &done, &upcoming] {
        store(&context, task);
    }
    let old = done
        .transition_to(TaskStatus::Completed, &context.clock)
        .expect("valid transition");
    context
        .rt
        .block_on(
            context
                .tasks
                .update_status(&done, &status_entry(&done, Actor::System, old)),
        )
        .expect("completion");

    let overdue = context
        .rt
        .block_on(context.tasks.list_past_deadline(base_instant()))
        .expect("past deadline listing");

    assert_eq!(overdue.iter().map(Task::id).collect::<Vec<_>>(), vec![open.id()]);
    context.cleanup();
}
