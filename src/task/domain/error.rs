//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the configured limit.
    #[error("task title has {actual} characters, limit is {max}")]
    TitleTooLong {
        /// Configured limit.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// The task description exceeds the configured limit.
    #[error("task description has {actual} characters, limit is {max}")]
    DescriptionTooLong {
        /// Configured limit.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// The requested status change is not an edge of the status machine.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing history actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown history action: {0}")]
pub struct ParseHistoryActionError(pub String);
