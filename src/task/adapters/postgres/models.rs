//! Diesel row models for task persistence.

use super::schema::{task_history, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Creator.
    pub creator_id: uuid::Uuid,
    /// Assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Status name.
    pub status: String,
    /// Priority name.
    pub priority: String,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Revision counter.
    pub revision: i64,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Creator.
    pub creator_id: uuid::Uuid,
    /// Assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Status name.
    pub status: String,
    /// Priority name.
    pub priority: String,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Revision counter.
    pub revision: i64,
}

/// Query result row for history entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Acting user.
    pub actor_id: Option<uuid::Uuid>,
    /// Action name.
    pub action: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Change timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for history entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_history)]
pub struct NewHistoryRow {
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Acting user.
    pub actor_id: Option<uuid::Uuid>,
    /// Action name.
    pub action: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Change timestamp.
    pub created_at: DateTime<Utc>,
}
