//! Turns committed task events into stored, delivered notifications.

use super::{MessageRenderer, NotificationDelivery};
use crate::notification::{
    domain::{NewNotification, Notification, NotificationKind},
    ports::{NotificationDispatcher, NotificationRepository},
};
use crate::task::{
    domain::{TaskEvent, TaskStatus},
    ports::{TaskEventSink, TaskEventSinkError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::warn;

/// Event sink producing assignment and completion notifications.
///
/// A new assignee hears about the task; the creator hears when it is
/// completed. Nobody is notified about their own action. Notifications are
/// stored before the first delivery attempt, which runs on a detached task so
/// the publishing operation never waits on the transport. A failed attempt
/// is retried by the scheduler's drain.
pub struct NotificationEventHandler<N, C>
where
    N: NotificationRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    notifications: Arc<N>,
    delivery: Arc<NotificationDelivery<N, C>>,
    in_flight: TaskTracker,
    renderer: MessageRenderer,
    clock: Arc<C>,
}

impl<N, C> NotificationEventHandler<N, C>
where
    N: NotificationRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a handler.
    #[must_use]
    pub fn new(
        notifications: Arc<N>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<C>,
        renderer: MessageRenderer,
        dispatch_timeout: Duration,
    ) -> Self {
        let delivery = NotificationDelivery::new(
            Arc::clone(&notifications),
            dispatcher,
            Arc::clone(&clock),
            dispatch_timeout,
        );
        Self {
            notifications,
            delivery: Arc::new(delivery),
            in_flight: TaskTracker::new(),
            renderer,
            clock,
        }
    }

    /// Waits until every delivery attempt started so far has finished.
    pub async fn wait_for_deliveries(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        self.in_flight.reopen();
    }

    fn deliver_detached(&self, notification: Notification) {
        let delivery = Arc::clone(&self.delivery);
        self.in_flight.spawn(async move {
            if let Err(err) = delivery.deliver(&notification).await {
                warn!(
                    notification_id = %notification.id(),
                    kind = %notification.kind(),
                    error = %err,
                    "immediate delivery failed, left for the next drain"
                );
            }
        });
    }

    fn draft_for(&self, event: &TaskEvent) -> Result<Option<NewNotification>, TaskEventSinkError> {
        let (recipient_id, kind, message) = match event {
            TaskEvent::Assigned {
                task,
                assignee_id,
                actor,
            } => {
                if actor.user_id() == Some(*assignee_id) {
                    return Ok(None);
                }
                let message = self
                    .renderer
                    .assignment(task)
                    .map_err(TaskEventSinkError::handler)?;
                (*assignee_id, NotificationKind::Assignment, message)
            }
            TaskEvent::StatusChanged {
                task,
                new_status: TaskStatus::Completed,
                actor,
                ..
            } => {
                if actor.user_id() == Some(task.creator_id()) {
                    return Ok(None);
                }
                let message = self
                    .renderer
                    .completed(task)
                    .map_err(TaskEventSinkError::handler)?;
                (task.creator_id(), NotificationKind::Completed, message)
            }
            TaskEvent::StatusChanged { .. } => return Ok(None),
        };
        Ok(Some(NewNotification {
            recipient_id,
            task_id: event.task().id(),
            kind,
            lead_hours: None,
            message,
            scheduled_at: self.clock.utc(),
        }))
    }
}

#[async_trait]
impl<N, C> TaskEventSink for NotificationEventHandler<N, C>
where
    N: NotificationRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn publish(&self, event: &TaskEvent) -> Result<(), TaskEventSinkError> {
        let Some(draft) = self.draft_for(event)? else {
            return Ok(());
        };
        let notification = Notification::schedule(draft, &*self.clock);
        self.notifications
            .create(&notification)
            .await
            .map_err(TaskEventSinkError::handler)?;
        self.deliver_detached(notification);
        Ok(())
    }
}
