//! Bounded delivery of a single stored notification.

use crate::notification::{
    domain::Notification,
    ports::{
        DispatchError, NotificationDispatcher, NotificationRepository, NotificationRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons a delivery attempt left the notification unsent.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The transport refused or timed out.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Delivery succeeded but could not be recorded.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),
}

/// Sends stored notifications and records successful delivery.
pub struct NotificationDelivery<N, C>
where
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    notifications: Arc<N>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<N, C> NotificationDelivery<N, C>
where
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a delivery helper bounding each attempt by `timeout`.
    #[must_use]
    pub fn new(
        notifications: Arc<N>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<C>,
        timeout: Duration,
    ) -> Self {
        Self {
            notifications,
            dispatcher,
            clock,
            timeout,
        }
    }

    /// Attempts delivery of `notification` once.
    ///
    /// A failed attempt leaves the notification unsent so the next drain
    /// retries it.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Dispatch`] when the transport fails or the
    /// attempt exceeds the timeout, and [`DeliveryError::Repository`] when
    /// the delivery cannot be recorded.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let attempt = self.dispatcher.send(
            notification.recipient_id(),
            notification.message(),
            Some(notification.task_id()),
        );
        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(DispatchError::TimedOut(self.timeout).into()),
        }

        let sent_at = self.clock.utc();
        match self.notifications.mark_sent(notification.id(), sent_at).await {
            Ok(()) => {
                debug!(
                    notification_id = %notification.id(),
                    kind = %notification.kind(),
                    "notification delivered"
                );
                Ok(())
            }
            Err(NotificationRepositoryError::AlreadySent(id)) => {
                warn!(notification_id = %id, "notification was delivered concurrently");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
