//! Notification categories.

use super::ParseNotificationKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a notification was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The deadline is approaching.
    Reminder,
    /// The task was handed to the recipient.
    Assignment,
    /// The deadline passed.
    Deadline,
    /// The task was finished.
    Completed,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::Assignment => "assignment",
            Self::Deadline => "deadline",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` for kinds that only matter while the task is open.
    #[must_use]
    pub const fn concerns_deadline(self) -> bool {
        matches!(self, Self::Reminder | Self::Deadline)
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "reminder" => Ok(Self::Reminder),
            "assignment" => Ok(Self::Assignment),
            "deadline" => Ok(Self::Deadline),
            "completed" => Ok(Self::Completed),
            other => Err(ParseNotificationKindError(other.to_owned())),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
