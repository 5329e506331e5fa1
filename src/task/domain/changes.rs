//! Typed field edits for admin task updates.

use super::{HistoryAction, TaskDescription, TaskPriority, TaskTitle};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};

/// Set of field edits applied in one update.
///
/// For optional task fields the outer `Option` says whether the field is
/// edited and the inner one carries the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<TaskTitle>,
    /// New description.
    pub description: Option<Option<TaskDescription>>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New deadline.
    pub deadline: Option<Option<DateTime<Utc>>>,
    /// New assignee.
    pub assignee: Option<Option<UserId>>,
}

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edits the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Edits the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<TaskDescription>) -> Self {
        self.description = Some(description);
        self
    }

    /// Edits the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Edits the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Edits the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Returns `true` when no field is edited.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.assignee.is_none()
    }
}

/// Field value that actually changed during an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// History action describing the field.
    pub action: HistoryAction,
    /// Rendered value before the change.
    pub old_value: Option<String>,
    /// Rendered value after the change.
    pub new_value: Option<String>,
}
