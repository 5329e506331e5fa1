//! Repository port for notification persistence.

use crate::notification::domain::{DedupKey, DedupScope, Notification, NotificationId};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Notification persistence contract.
///
/// De-duplication state lives only here, so a restarted scheduler sees
/// every notification its predecessor created.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a new notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::Duplicate`] when the identifier
    /// already exists.
    async fn create(&self, notification: &Notification) -> NotificationRepositoryResult<()>;

    /// Returns whether a notification matching `key` exists within `scope`.
    async fn exists(&self, key: DedupKey, scope: DedupScope) -> NotificationRepositoryResult<bool>;

    /// Returns unsent notifications scheduled at or before `now`, earliest
    /// first.
    async fn list_pending(
        &self,
        now: DateTime<Utc>,
    ) -> NotificationRepositoryResult<Vec<Notification>>;

    /// Returns every notification about a task, oldest first.
    async fn list_for_task(&self, task_id: TaskId)
    -> NotificationRepositoryResult<Vec<Notification>>;

    /// Records delivery of a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] for unknown
    /// identifiers and [`NotificationRepositoryError::AlreadySent`] when
    /// delivery was recorded before.
    async fn mark_sent(
        &self,
        id: NotificationId,
        sent_at: DateTime<Utc>,
    ) -> NotificationRepositoryResult<()>;

    /// Deletes an unsent notification that no longer needs delivering.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] for unknown
    /// identifiers and [`NotificationRepositoryError::AlreadySent`] when the
    /// notification was delivered in the meantime.
    async fn discard(&self, id: NotificationId) -> NotificationRepositoryResult<()>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// The identifier already exists.
    #[error("duplicate notification: {0}")]
    Duplicate(NotificationId),

    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Delivery was already recorded.
    #[error("notification already sent: {0}")]
    AlreadySent(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
