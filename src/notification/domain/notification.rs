//! Notification aggregate and its de-duplication key.

use super::{NotificationDomainError, NotificationId, NotificationKind};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Identity used to detect duplicate notifications.
///
/// Reminders carry their lead time; other kinds leave it empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    /// Task the notification is about.
    pub task_id: TaskId,
    /// Notification category.
    pub kind: NotificationKind,
    /// Hours before the deadline, for reminders.
    pub lead_hours: Option<u32>,
}

impl DedupKey {
    /// Key of the single overdue alert a task may ever receive.
    #[must_use]
    pub const fn deadline(task_id: TaskId) -> Self {
        Self {
            task_id,
            kind: NotificationKind::Deadline,
            lead_hours: None,
        }
    }

    /// Key of a reminder for one lead time.
    #[must_use]
    pub const fn reminder(task_id: TaskId, lead_hours: u32) -> Self {
        Self {
            task_id,
            kind: NotificationKind::Reminder,
            lead_hours: Some(lead_hours),
        }
    }
}

/// Which stored notifications count when checking a [`DedupKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupScope {
    /// Any notification ever stored, sent or not.
    Lifetime,
    /// Only notifications still waiting for delivery.
    Unsent,
}

/// Parameters for a new notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Recipient.
    pub recipient_id: UserId,
    /// Related task.
    pub task_id: TaskId,
    /// Category.
    pub kind: NotificationKind,
    /// Hours before the deadline, for reminders.
    pub lead_hours: Option<u32>,
    /// Rendered message body.
    pub message: String,
    /// Earliest delivery time.
    pub scheduled_at: DateTime<Utc>,
}

/// A message waiting for, or past, delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient_id: UserId,
    task_id: TaskId,
    kind: NotificationKind,
    lead_hours: Option<u32>,
    message: String,
    scheduled_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing persisted notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Related task.
    pub task_id: TaskId,
    /// Category.
    pub kind: NotificationKind,
    /// Reminder lead time.
    pub lead_hours: Option<u32>,
    /// Message body.
    pub message: String,
    /// Earliest delivery time.
    pub scheduled_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Delivery timestamp.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Creates an unsent notification.
    #[must_use]
    pub fn schedule(draft: NewNotification, clock: &impl Clock) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id: draft.recipient_id,
            task_id: draft.task_id,
            kind: draft.kind,
            lead_hours: draft.lead_hours,
            message: draft.message,
            scheduled_at: draft.scheduled_at,
            created_at: clock.utc(),
            sent_at: None,
        }
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            recipient_id: data.recipient_id,
            task_id: data.task_id,
            kind: data.kind,
            lead_hours: data.lead_hours,
            message: data.message,
            scheduled_at: data.scheduled_at,
            created_at: data.created_at,
            sent_at: data.sent_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient_id(&self) -> UserId {
        self.recipient_id
    }

    /// Returns the related task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the category.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the reminder lead time.
    #[must_use]
    pub const fn lead_hours(&self) -> Option<u32> {
        self.lead_hours
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the earliest delivery time.
    #[must_use]
    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the delivery timestamp.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Returns `true` once delivered.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }

    /// Returns `true` when unsent and scheduled at or before `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_sent() && self.scheduled_at <= now
    }

    /// Returns the de-duplication identity.
    #[must_use]
    pub const fn dedup_key(&self) -> DedupKey {
        DedupKey {
            task_id: self.task_id,
            kind: self.kind,
            lead_hours: self.lead_hours,
        }
    }

    /// Returns whether this notification counts against `key` in `scope`.
    #[must_use]
    pub fn matches(&self, key: DedupKey, scope: DedupScope) -> bool {
        let in_scope = match scope {
            DedupScope::Lifetime => true,
            DedupScope::Unsent => !self.is_sent(),
        };
        in_scope && self.dedup_key() == key
    }

    /// Records delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::AlreadySent`] when delivery was
    /// already recorded.
    pub const fn mark_sent(&mut self, at: DateTime<Utc>) -> Result<(), NotificationDomainError> {
        if self.sent_at.is_some() {
            return Err(NotificationDomainError::AlreadySent(self.id));
        }
        self.sent_at = Some(at);
        Ok(())
    }
}
