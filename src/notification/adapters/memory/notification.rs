//! In-memory repository for notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{DedupKey, DedupScope, Notification, NotificationDomainError, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::domain::TaskId;

/// Thread-safe in-memory notification repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    state: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, predicate: F) -> NotificationRepositoryResult<Vec<Notification>>
    where
        F: Fn(&Notification) -> bool,
    {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .filter(|notification| predicate(notification))
            .cloned()
            .collect())
    }
}

fn lock_error(err: impl std::fmt::Display) -> NotificationRepositoryError {
    NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.contains_key(&notification.id()) {
            return Err(NotificationRepositoryError::Duplicate(notification.id()));
        }
        state.insert(notification.id(), notification.clone());
        Ok(())
    }

    async fn exists(&self, key: DedupKey, scope: DedupScope) -> NotificationRepositoryResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .any(|notification| notification.matches(key, scope)))
    }

    async fn list_pending(
        &self,
        now: DateTime<Utc>,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let mut pending = self.collect(|notification| notification.is_due(now))?;
        pending.sort_by_key(|notification| (notification.scheduled_at(), notification.created_at()));
        Ok(pending)
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let mut notifications = self.collect(|notification| notification.task_id() == task_id)?;
        notifications.sort_by_key(Notification::created_at);
        Ok(notifications)
    }

    async fn mark_sent(
        &self,
        id: NotificationId,
        sent_at: DateTime<Utc>,
    ) -> NotificationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let notification = state
            .get_mut(&id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;
        notification
            .mark_sent(sent_at)
            .map_err(|NotificationDomainError::AlreadySent(sent)| {
                NotificationRepositoryError::AlreadySent(sent)
            })
    }

    async fn discard(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        match state.get(&id) {
            None => Err(NotificationRepositoryError::NotFound(id)),
            Some(notification) if notification.is_sent() => {
                Err(NotificationRepositoryError::AlreadySent(id))
            }
            Some(_) => {
                state.remove(&id);
                Ok(())
            }
        }
    }
}
