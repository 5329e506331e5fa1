//! Task status machine and priority.

use super::{ParsePriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    New,
    /// The assignee is working on the task.
    InProgress,
    /// Work is finished.
    Completed,
    /// The deadline passed before the task was finished.
    Overdue,
    /// An admin withdrew the task.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::InProgress,
        Self::Completed,
        Self::Overdue,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether ordinary flows may move a task from `self` to
    /// `target`.
    ///
    /// Forced admin overrides do not consult this table.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::New,
                Self::InProgress | Self::Completed | Self::Overdue | Self::Cancelled
            ) | (
                Self::InProgress,
                Self::Completed | Self::Overdue | Self::Cancelled
            ) | (Self::Overdue, Self::Cancelled)
        )
    }

    /// Returns `true` for statuses ordinary flows never leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` for statuses that still expect work.
    ///
    /// This is the single definition of "active" used by reminders,
    /// statistics, and listings.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl TaskPriority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParsePriorityError;

    /// Accepts storage names, one-letter and numeric shortcuts, and the
    /// Russian labels used by the chat menus.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "low" | "l" | "1" | "низкий" | "низ" => Ok(Self::Low),
            "medium" | "m" | "2" | "средний" | "сред" => Ok(Self::Medium),
            "high" | "h" | "3" | "высокий" | "выс" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
