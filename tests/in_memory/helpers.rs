//! Shared wiring for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use crate::test_helpers::{ManualClock, base_instant, register};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use taskdesk::notification::{
    adapters::memory::{InMemoryDispatcher, InMemoryNotificationRepository},
    domain::{Notification, NotificationKind},
    ports::{NotificationDispatcher, NotificationRepository},
    services::{MessageRenderer, NotificationEventHandler, NotificationScheduler, SchedulerSettings},
};
use taskdesk::task::{
    adapters::{events::CompositeEventSink, memory::InMemoryTaskRepository},
    domain::{Task, TaskId},
    ports::TaskEventSink,
    services::{CreateTaskRequest, LifecycleSettings, TaskLifecycleService},
};
use taskdesk::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{Role, UserId},
};

/// Lifecycle service over in-memory adapters.
pub type DeskLifecycle =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, ManualClock>;

/// Scheduler over in-memory adapters.
pub type DeskScheduler = NotificationScheduler<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    InMemoryNotificationRepository,
    ManualClock,
>;

/// Notification event handler over in-memory adapters.
pub type DeskHandler = NotificationEventHandler<InMemoryNotificationRepository, ManualClock>;

/// A fully wired desk with one admin and two workers.
pub struct Desk {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub dispatcher: Arc<InMemoryDispatcher>,
    pub clock: Arc<ManualClock>,
    pub lifecycle: Arc<DeskLifecycle>,
    pub handler: Arc<DeskHandler>,
    pub admin: UserId,
    pub worker: UserId,
    pub other_worker: UserId,
}

/// Builds a desk with the clock frozen at [`base_instant`].
///
/// # Errors
///
/// Returns an error if the seed users cannot be stored.
pub async fn build_desk() -> eyre::Result<Desk> {
    let clock = Arc::new(ManualClock::new(base_instant()));
    let users = Arc::new(InMemoryUserRepository::new());
    let admin = register(&*users, &clock, 100, "Alice", Role::Admin).await?;
    let worker = register(&*users, &clock, 200, "Bob", Role::Worker).await?;
    let other_worker = register(&*users, &clock, 300, "Carol", Role::Worker).await?;

    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let dispatcher = Arc::new(InMemoryDispatcher::new());
    let handler = Arc::new(NotificationEventHandler::new(
        Arc::clone(&notifications),
        Arc::clone(&dispatcher) as Arc<dyn NotificationDispatcher>,
        Arc::clone(&clock),
        MessageRenderer::default(),
        Duration::from_secs(5),
    ));
    let events: Arc<dyn TaskEventSink> =
        Arc::new(CompositeEventSink::new().with_sink(Arc::clone(&handler) as Arc<dyn TaskEventSink>));
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let lifecycle = Arc::new(TaskLifecycleService::new(
        Arc::clone(&tasks),
        Arc::clone(&users),
        events,
        Arc::clone(&clock),
        LifecycleSettings::default(),
    ));
    Ok(Desk {
        tasks,
        users,
        notifications,
        dispatcher,
        clock,
        lifecycle,
        handler,
        admin,
        worker,
        other_worker,
    })
}

impl Desk {
    /// Creates a scheduler with default settings.
    pub fn scheduler(&self) -> DeskScheduler {
        NotificationScheduler::new(
            Arc::clone(&self.lifecycle),
            Arc::clone(&self.notifications),
            Arc::clone(&self.dispatcher) as Arc<dyn NotificationDispatcher>,
            Arc::clone(&self.clock),
            MessageRenderer::default(),
            SchedulerSettings::default(),
        )
    }

    /// Has the admin create a task for `assignee`, due `hours` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if creation is refused.
    pub async fn assigned_task(
        &self,
        title: &str,
        assignee: UserId,
        hours: i64,
    ) -> eyre::Result<Task> {
        let deadline = self.in_hours(hours);
        let request = CreateTaskRequest::new(title)
            .with_deadline(deadline)
            .with_assignee(assignee);
        let task = self.lifecycle.create_task(request, self.admin).await?;
        self.settle().await;
        Ok(task)
    }

    /// Waits until immediate notification attempts have finished.
    pub async fn settle(&self) {
        self.handler.wait_for_deliveries().await;
    }

    /// Returns the instant `hours` after the current clock reading.
    pub fn in_hours(&self, hours: i64) -> DateTime<Utc> {
        self.clock.utc() + TimeDelta::hours(hours)
    }

    /// Returns stored notifications of one kind for a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository lookup fails.
    pub async fn notifications_of(
        &self,
        task_id: TaskId,
        kind: NotificationKind,
    ) -> eyre::Result<Vec<Notification>> {
        Ok(self
            .notifications
            .list_for_task(task_id)
            .await?
            .into_iter()
            .filter(|notification| notification.kind() == kind)
            .collect())
    }
}
