//! Append-only task audit trail.

use super::{ParseHistoryActionError, TaskId};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who performed a recorded change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Actor {
    /// A registered user.
    User(UserId),
    /// The scheduler or another automated process.
    System,
}

impl Actor {
    /// Returns the acting user, if any.
    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(id),
            Self::System => None,
        }
    }
}

impl From<UserId> for Actor {
    fn from(value: UserId) -> Self {
        Self::User(value)
    }
}

/// Kind of change recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// The status moved along a permitted edge.
    StatusChanged,
    /// An admin set the status outside the permitted edges.
    StatusForced,
    /// The assignee was set, replaced, or cleared.
    Assigned,
    /// The title was edited.
    TitleUpdated,
    /// The description was edited.
    DescriptionUpdated,
    /// The priority was edited.
    PriorityUpdated,
    /// The deadline was edited.
    DeadlineUpdated,
}

impl HistoryAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged => "status_changed",
            Self::StatusForced => "status_forced",
            Self::Assigned => "assigned",
            Self::TitleUpdated => "title_updated",
            Self::DescriptionUpdated => "description_updated",
            Self::PriorityUpdated => "priority_updated",
            Self::DeadlineUpdated => "deadline_updated",
        }
    }
}

impl TryFrom<&str> for HistoryAction {
    type Error = ParseHistoryActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "created" => Ok(Self::Created),
            "status_changed" => Ok(Self::StatusChanged),
            "status_forced" => Ok(Self::StatusForced),
            "assigned" | "assignee_id_updated" => Ok(Self::Assigned),
            "title_updated" => Ok(Self::TitleUpdated),
            "description_updated" => Ok(Self::DescriptionUpdated),
            "priority_updated" => Ok(Self::PriorityUpdated),
            "deadline_updated" => Ok(Self::DeadlineUpdated),
            _ => Err(ParseHistoryActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryEntry {
    task_id: TaskId,
    actor: Actor,
    action: HistoryAction,
    old_value: Option<String>,
    new_value: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TaskHistoryEntry {
    /// Creates an entry without before/after values.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        actor: Actor,
        action: HistoryAction,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            actor,
            action,
            old_value: None,
            new_value: None,
            recorded_at,
        }
    }

    /// Attaches the value before the change.
    #[must_use]
    pub fn with_old_value(mut self, value: Option<String>) -> Self {
        self.old_value = value;
        self
    }

    /// Attaches the value after the change.
    #[must_use]
    pub fn with_new_value(mut self, value: Option<String>) -> Self {
        self.new_value = value;
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns who made the change.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.action
    }

    /// Returns the value before the change.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns when the change happened.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
