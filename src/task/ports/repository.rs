//! Repository port for task persistence, history, and lookup.

use super::TaskQuery;
use crate::task::domain::{Task, TaskHistoryEntry, TaskId, TaskStatus};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every mutating call writes the task row and its history entries in one
/// unit of work: either both are visible afterwards or neither is. Updates
/// are guarded by the task revision; the stored revision must be exactly one
/// less than the revision of the task passed in.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task with its creation entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn create(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()>;

    /// Persists a status change with its history entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::Conflict`] when it was modified concurrently.
    async fn update_status(&self, task: &Task, entry: &TaskHistoryEntry)
    -> TaskRepositoryResult<()>;

    /// Persists an assignee change with its history entry.
    ///
    /// # Errors
    ///
    /// Same as [`TaskRepository::update_status`].
    async fn reassign(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()>;

    /// Persists field edits with one history entry per changed field.
    ///
    /// # Errors
    ///
    /// Same as [`TaskRepository::update_status`].
    async fn update_fields(
        &self,
        task: &Task,
        entries: &[TaskHistoryEntry],
    ) -> TaskRepositoryResult<()>;

    /// Appends a standalone history entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn append_history(&self, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns tasks assigned to `assignee_id`, optionally filtered by status,
    /// in listing order.
    async fn list_by_assignee(
        &self,
        assignee_id: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task, optionally filtered by status, in listing order.
    async fn list_all(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns one page of tasks matching `query`, in listing order.
    async fn search(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the history of a task, oldest first.
    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>>;

    /// Returns tasks whose deadline is before `now` and whose status is
    /// neither completed nor cancelled.
    async fn list_past_deadline(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns active tasks that have both a deadline and an assignee.
    async fn list_reminder_candidates(&self) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored revision does not precede the submitted one.
    #[error("task {task_id} was modified concurrently (stored revision {stored}, submitted {submitted})")]
    Conflict {
        /// Task being updated.
        task_id: TaskId,
        /// Revision found in storage.
        stored: u64,
        /// Revision carried by the update.
        submitted: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
