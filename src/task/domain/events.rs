//! Events emitted after committed task mutations.

use super::{Actor, Task, TaskStatus};
use crate::user::domain::UserId;

/// Fact published once a mutation and its history are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The task status changed.
    StatusChanged {
        /// Task after the change.
        task: Task,
        /// Status before the change.
        old_status: TaskStatus,
        /// Status after the change.
        new_status: TaskStatus,
        /// Who made the change.
        actor: Actor,
    },
    /// The task received a new assignee.
    Assigned {
        /// Task after the change.
        task: Task,
        /// The new assignee.
        assignee_id: UserId,
        /// Who made the change.
        actor: Actor,
    },
}

impl TaskEvent {
    /// Returns the task carried by the event.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::StatusChanged { task, .. } | Self::Assigned { task, .. } => task,
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "status_changed",
            Self::Assigned { .. } => "assigned",
        }
    }
}
