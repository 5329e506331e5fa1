//! Periodic deadline sweep, reminder planning, and outbox drain.
//!
//! Each tick runs three phases in order:
//!
//! 1. tasks past their deadline are marked overdue and their assignee gets
//!    one overdue alert for the lifetime of the task;
//! 2. reminders whose send time falls inside the coming window are stored,
//!    one per task and lead time while unsent;
//! 3. every due, unsent notification is delivered, each failure isolated
//!    from the rest. Reminders and overdue alerts whose task has since been
//!    completed or cancelled are discarded instead.
//!
//! All de-duplication state is persisted, so the loop can restart at any
//! point without repeating alerts.

use super::{MessageRenderer, NotificationDelivery, RenderError};
use crate::notification::{
    domain::{DedupKey, DedupScope, NewNotification, Notification, NotificationId, NotificationKind},
    ports::{NotificationDispatcher, NotificationRepository, NotificationRepositoryError},
};
use crate::task::{
    domain::{Task, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use crate::user::ports::UserRepository;
use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use mockable::Clock;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Timing and reminder tunables for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Pause between successful ticks.
    pub tick_interval: Duration,
    /// Pause after a failed tick.
    pub recovery_interval: Duration,
    /// Hours before the deadline at which reminders fire.
    pub lead_hours: Vec<u32>,
    /// How far ahead reminders are planned.
    pub reminder_window: TimeDelta,
    /// Upper bound on a single delivery attempt.
    pub dispatch_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(300),
            recovery_interval: Duration::from_secs(60),
            lead_hours: vec![24, 6, 1],
            reminder_window: TimeDelta::hours(1),
            dispatch_timeout: Duration::from_secs(30),
        }
    }
}

/// Counters describing one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks moved to overdue.
    pub marked_overdue: usize,
    /// Overdue alerts created.
    pub deadline_alerts: usize,
    /// Reminders stored for later delivery.
    pub reminders_scheduled: usize,
    /// Notifications delivered.
    pub delivered: usize,
    /// Delivery attempts that failed.
    pub failed: usize,
    /// Stale deadline notifications dropped without delivery.
    pub discarded: usize,
}

impl TickReport {
    /// Returns `true` when the tick found nothing to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.marked_overdue == 0
            && self.deadline_alerts == 0
            && self.reminders_scheduled == 0
            && self.delivered == 0
            && self.failed == 0
            && self.discarded == 0
    }
}

/// Failures that abort a tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Loading or updating tasks failed.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),

    /// Reading or writing notifications failed.
    #[error(transparent)]
    Notifications(#[from] NotificationRepositoryError),

    /// A message could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Default)]
struct TickState {
    report: TickReport,
    attempted: HashSet<NotificationId>,
}

/// Background service driving overdue detection and notification delivery.
pub struct NotificationScheduler<R, U, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    lifecycle: Arc<TaskLifecycleService<R, U, C>>,
    notifications: Arc<N>,
    delivery: NotificationDelivery<N, C>,
    renderer: MessageRenderer,
    clock: Arc<C>,
    settings: SchedulerSettings,
}

impl<R, U, N, C> NotificationScheduler<R, U, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler.
    #[must_use]
    pub fn new(
        lifecycle: Arc<TaskLifecycleService<R, U, C>>,
        notifications: Arc<N>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<C>,
        renderer: MessageRenderer,
        settings: SchedulerSettings,
    ) -> Self {
        let delivery = NotificationDelivery::new(
            Arc::clone(&notifications),
            dispatcher,
            Arc::clone(&clock),
            settings.dispatch_timeout,
        );
        Self {
            lifecycle,
            notifications,
            delivery,
            renderer,
            clock,
            settings,
        }
    }

    /// Returns the scheduler settings.
    #[must_use]
    pub const fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Runs ticks until `shutdown` is cancelled.
    ///
    /// A failed or panicking tick is logged and followed by the shorter
    /// recovery pause; the loop itself never stops on its own.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            tick_secs = self.settings.tick_interval.as_secs(),
            lead_hours = ?self.settings.lead_hours,
            "notification scheduler started"
        );
        loop {
            let pause = match AssertUnwindSafe(self.tick()).catch_unwind().await {
                Ok(Ok(_)) => self.settings.tick_interval,
                Ok(Err(err)) => {
                    error!(error = %err, "scheduler tick failed");
                    self.settings.recovery_interval
                }
                Err(_) => {
                    error!("scheduler tick panicked");
                    self.settings.recovery_interval
                }
            };
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(pause) => {}
            }
        }
        info!("notification scheduler stopped");
    }

    /// Runs one sweep, reminder, and drain pass.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when storage fails outside per-item
    /// delivery; delivery failures are counted, never returned.
    pub async fn tick(&self) -> Result<TickReport, SchedulerError> {
        let now = self.clock.utc();
        let mut state = TickState::default();

        self.sweep(now, &mut state).await?;
        self.schedule_reminders(now, &mut state).await?;
        self.drain(now, &mut state).await?;

        let report = state.report;
        if report.is_idle() {
            debug!("scheduler tick found no work");
        } else {
            info!(
                marked_overdue = report.marked_overdue,
                deadline_alerts = report.deadline_alerts,
                reminders_scheduled = report.reminders_scheduled,
                delivered = report.delivered,
                failed = report.failed,
                discarded = report.discarded,
                "scheduler tick finished"
            );
        }
        Ok(report)
    }

    async fn sweep(&self, now: DateTime<Utc>, state: &mut TickState) -> Result<(), SchedulerError> {
        for candidate in self.lifecycle.overdue_candidates(now).await? {
            let Some(task) = self.mark_overdue(candidate, state).await? else {
                continue;
            };
            self.alert_deadline(&task, now, state).await?;
        }
        Ok(())
    }

    async fn mark_overdue(
        &self,
        candidate: Task,
        state: &mut TickState,
    ) -> Result<Option<Task>, SchedulerError> {
        if candidate.status() == TaskStatus::Overdue {
            return Ok(Some(candidate));
        }
        match self.lifecycle.mark_overdue(candidate.id()).await {
            Ok(Some(task)) => {
                state.report.marked_overdue += 1;
                Ok(Some(task))
            }
            Ok(None) => Ok(Some(candidate)),
            Err(
                TaskLifecycleError::Domain(_)
                | TaskLifecycleError::TaskNotFound(_)
                | TaskLifecycleError::Repository(TaskRepositoryError::Conflict { .. }),
            ) => {
                debug!(task_id = %candidate.id(), "task changed during sweep, skipped");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn alert_deadline(
        &self,
        task: &Task,
        now: DateTime<Utc>,
        state: &mut TickState,
    ) -> Result<(), SchedulerError> {
        let Some(recipient_id) = task.assignee_id() else {
            debug!(task_id = %task.id(), "overdue task has no assignee to alert");
            return Ok(());
        };
        if self
            .notifications
            .exists(DedupKey::deadline(task.id()), DedupScope::Lifetime)
            .await?
        {
            return Ok(());
        }

        let notification = Notification::schedule(
            NewNotification {
                recipient_id,
                task_id: task.id(),
                kind: NotificationKind::Deadline,
                lead_hours: None,
                message: self.renderer.overdue(task)?,
                scheduled_at: now,
            },
            &*self.clock,
        );
        self.notifications.create(&notification).await?;
        state.report.deadline_alerts += 1;
        self.attempt(&notification, state).await;
        Ok(())
    }

    async fn schedule_reminders(
        &self,
        now: DateTime<Utc>,
        state: &mut TickState,
    ) -> Result<(), SchedulerError> {
        let horizon = now
            .checked_add_signed(self.settings.reminder_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        for task in self.lifecycle.reminder_candidates().await? {
            let (Some(deadline), Some(recipient_id)) = (task.deadline(), task.assignee_id()) else {
                continue;
            };
            for &lead_hours in &self.settings.lead_hours {
                let Some(remind_at) =
                    deadline.checked_sub_signed(TimeDelta::hours(i64::from(lead_hours)))
                else {
                    continue;
                };
                if remind_at < now || remind_at > horizon {
                    continue;
                }
                let key = DedupKey::reminder(task.id(), lead_hours);
                if self.notifications.exists(key, DedupScope::Unsent).await? {
                    continue;
                }

                let notification = Notification::schedule(
                    NewNotification {
                        recipient_id,
                        task_id: task.id(),
                        kind: NotificationKind::Reminder,
                        lead_hours: Some(lead_hours),
                        message: self.renderer.reminder(&task, lead_hours)?,
                        scheduled_at: remind_at,
                    },
                    &*self.clock,
                );
                self.notifications.create(&notification).await?;
                state.report.reminders_scheduled += 1;
                debug!(task_id = %task.id(), lead_hours, %remind_at, "reminder scheduled");
            }
        }
        Ok(())
    }

    async fn drain(&self, now: DateTime<Utc>, state: &mut TickState) -> Result<(), SchedulerError> {
        for notification in self.notifications.list_pending(now).await? {
            if state.attempted.contains(&notification.id()) {
                continue;
            }
            if self.is_stale(&notification).await? {
                self.discard(&notification, state).await?;
                continue;
            }
            self.attempt(&notification, state).await;
        }
        Ok(())
    }

    async fn is_stale(&self, notification: &Notification) -> Result<bool, SchedulerError> {
        if !notification.kind().concerns_deadline() {
            return Ok(false);
        }
        let task = self.lifecycle.find_task(notification.task_id()).await?;
        Ok(task.is_none_or(|task| task.status().is_terminal()))
    }

    async fn discard(
        &self,
        notification: &Notification,
        state: &mut TickState,
    ) -> Result<(), SchedulerError> {
        state.attempted.insert(notification.id());
        match self.notifications.discard(notification.id()).await {
            Ok(()) => {
                state.report.discarded += 1;
                debug!(
                    notification_id = %notification.id(),
                    kind = %notification.kind(),
                    "task finished before delivery, notification discarded"
                );
                Ok(())
            }
            Err(
                NotificationRepositoryError::AlreadySent(_) | NotificationRepositoryError::NotFound(_),
            ) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn attempt(&self, notification: &Notification, state: &mut TickState) {
        state.attempted.insert(notification.id());
        match self.delivery.deliver(notification).await {
            Ok(()) => state.report.delivered += 1,
            Err(err) => {
                state.report.failed += 1;
                warn!(
                    notification_id = %notification.id(),
                    recipient_id = %notification.recipient_id(),
                    kind = %notification.kind(),
                    error = %err,
                    "notification delivery failed, will retry next tick"
                );
            }
        }
    }
}
