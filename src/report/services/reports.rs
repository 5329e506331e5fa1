//! Report assembly over the task and user repositories.

use crate::report::domain::{
    GeneralStats, ReportData, TaskCounts, TaskSnapshot, UserDirectory, general_stats, user_stats,
};
use crate::report::ports::{ReportError, ReportRenderer};
use crate::task::domain::{Task, TaskStatus};
use crate::task::ports::TaskRepository;
use crate::user::domain::UserId;
use crate::user::ports::UserRepository;
use camino::Utf8PathBuf;
use mockable::Clock;
use std::sync::Arc;

/// Narrows the tasks a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user.
    pub assignee_id: Option<UserId>,
}

impl ReportFilter {
    /// Restricts the report to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the report to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    fn admits(&self, task: &Task) -> bool {
        self.assignee_id
            .is_none_or(|assignee_id| task.is_assigned_to(assignee_id))
    }
}

/// Read-only reporting over tasks and users.
///
/// Access control is left to the caller; every method sees all tasks.
#[derive(Clone)]
pub struct ReportService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<R, U, C> ReportService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new report service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            users,
            clock,
        }
    }

    /// Counters over the tasks assigned to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Tasks`] when tasks cannot be loaded.
    pub async fn user_stats(&self, user_id: UserId) -> Result<TaskCounts, ReportError> {
        let tasks = self.tasks.list_all(None).await?;
        Ok(user_stats(&tasks, user_id))
    }

    /// Organisation-wide counters.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Tasks`] or [`ReportError::Users`] when loading
    /// fails.
    pub async fn general_stats(&self) -> Result<GeneralStats, ReportError> {
        let tasks = self.tasks.list_all(None).await?;
        let users = self.users.list_active(None).await?;
        Ok(general_stats(&tasks, &users))
    }

    /// Flat task rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Tasks`] or [`ReportError::Users`] when loading
    /// fails.
    pub async fn snapshots(&self, filter: ReportFilter) -> Result<Vec<TaskSnapshot>, ReportError> {
        let tasks = self.filtered_tasks(filter).await?;
        let users = self.users.list_active(None).await?;
        let directory = UserDirectory::new(&users);
        Ok(tasks
            .iter()
            .map(|task| TaskSnapshot::of(task, &directory))
            .collect())
    }

    /// Assembles the report for `filter` without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Tasks`] or [`ReportError::Users`] when loading
    /// fails.
    pub async fn assemble(&self, filter: ReportFilter) -> Result<ReportData, ReportError> {
        let tasks = self.filtered_tasks(filter).await?;
        let users = self.users.list_active(None).await?;
        Ok(ReportData::assemble(&tasks, &users, self.clock.utc()))
    }

    /// Assembles the report for `filter` and hands it to `renderer`.
    ///
    /// # Errors
    ///
    /// Propagates loading failures and any error from the renderer.
    pub async fn export(
        &self,
        renderer: &dyn ReportRenderer,
        filter: ReportFilter,
    ) -> Result<Utf8PathBuf, ReportError> {
        let data = self.assemble(filter).await?;
        renderer.render(&data).await
    }

    async fn filtered_tasks(&self, filter: ReportFilter) -> Result<Vec<Task>, ReportError> {
        let mut tasks = self.tasks.list_all(filter.status).await?;
        tasks.retain(|task| filter.admits(task));
        Ok(tasks)
    }
}
