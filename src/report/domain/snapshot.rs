//! Flat task projections consumed by report renderers.

use crate::task::domain::{Task, TaskId, TaskPriority, TaskStatus};
use crate::user::domain::{User, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Label used for tasks without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// One task as a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Creator.
    pub creator_id: UserId,
    /// Assignee.
    pub assignee_id: Option<UserId>,
    /// Assignee display name, or [`UNASSIGNED`].
    pub assignee_name: String,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Whole days from creation to completion.
    pub completion_days: Option<i64>,
}

/// Lookup from user id to display name.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<UserId, String>,
}

impl UserDirectory {
    /// Indexes the given users.
    pub fn new<'a>(users: impl IntoIterator<Item = &'a User>) -> Self {
        Self {
            names: users
                .into_iter()
                .map(|user| (user.id(), user.display_name().to_string()))
                .collect(),
        }
    }

    /// Returns the display name for an optional assignee.
    ///
    /// Unknown users are shown by id.
    #[must_use]
    pub fn label(&self, user_id: Option<UserId>) -> String {
        match user_id {
            None => UNASSIGNED.to_owned(),
            Some(id) => self
                .names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

/// Whole days between creation and completion, if completed.
#[must_use]
pub fn completion_days(task: &Task) -> Option<i64> {
    task.completed_at()
        .map(|completed| (completed - task.created_at()).num_days())
}

impl TaskSnapshot {
    /// Projects a task using `directory` for the assignee name.
    #[must_use]
    pub fn of(task: &Task, directory: &UserDirectory) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(ToString::to_string),
            status: task.status(),
            priority: task.priority(),
            creator_id: task.creator_id(),
            assignee_id: task.assignee_id(),
            assignee_name: directory.label(task.assignee_id()),
            deadline: task.deadline(),
            created_at: task.created_at(),
            completed_at: task.completed_at(),
            completion_days: completion_days(task),
        }
    }
}
