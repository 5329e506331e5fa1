//! Diesel row model for notifications.

use super::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for notifications.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient.
    pub recipient_id: uuid::Uuid,
    /// Related task.
    pub task_id: uuid::Uuid,
    /// Category name.
    pub kind: String,
    /// Reminder lead time.
    pub lead_hours: Option<i32>,
    /// Message body.
    pub message: String,
    /// Earliest delivery time.
    pub scheduled_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Delivery timestamp.
    pub sent_at: Option<DateTime<Utc>>,
}
