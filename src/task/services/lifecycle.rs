//! Task lifecycle orchestration: creation, status machine, assignment,
//! edits, and reads, each gated by the authorization predicate.

use super::{FieldEdits, RejectedField, TaskOperation, can_modify};
use crate::local_time::DeadlineParser;
use crate::task::{
    domain::{
        Actor, HistoryAction, NewTask, Task, TaskChanges, TaskDescription, TaskDomainError,
        TaskEvent, TaskHistoryEntry, TaskId, TaskPriority, TaskStatus, TaskTitle, TextLimits,
    },
    ports::{TaskEventSink, TaskQuery, TaskRepository, TaskRepositoryError},
};
use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
    assignee_id: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            deadline: None,
            assignee_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the initial assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }
}

/// Tunables for lifecycle validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleSettings {
    /// Title and description limits.
    pub limits: TextLimits,
    /// Parser for deadline edits.
    pub deadline_parser: DeadlineParser,
}

/// Outcome of a raw field update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdateOutcome {
    /// Task after the accepted edits.
    pub task: Task,
    /// Edits that were skipped.
    pub rejected: Vec<RejectedField>,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The actor may not perform the operation.
    #[error("user {actor_id} may not {operation}")]
    Forbidden {
        /// Acting user.
        actor_id: UserId,
        /// Refused operation.
        operation: TaskOperation,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    users: Arc<U>,
    events: Arc<dyn TaskEventSink>,
    clock: Arc<C>,
    settings: LifecycleSettings,
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(
        tasks: Arc<R>,
        users: Arc<U>,
        events: Arc<dyn TaskEventSink>,
        clock: Arc<C>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            tasks,
            users,
            events,
            clock,
            settings,
        }
    }

    /// Returns the validation settings.
    #[must_use]
    pub const fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Creates a task on behalf of an admin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] for workers,
    /// [`TaskLifecycleError::UserNotFound`] when the actor or assignee is
    /// unknown, or [`TaskLifecycleError::Domain`] when the text exceeds the
    /// configured limits.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        authorize(&actor, None, TaskOperation::Create)?;
        if let Some(assignee) = request.assignee_id {
            self.require_user(assignee).await?;
        }

        let limits = self.settings.limits;
        let description = match request.description {
            Some(text) => TaskDescription::new(text, limits)?,
            None => None,
        };
        let draft = NewTask {
            title: TaskTitle::new(request.title, limits)?,
            description,
            creator_id: actor_id,
            assignee_id: request.assignee_id,
            priority: request.priority,
            deadline: request.deadline,
        };
        let task = Task::create(draft, &*self.clock);
        let entry = TaskHistoryEntry::new(
            task.id(),
            Actor::User(actor_id),
            HistoryAction::Created,
            task.created_at(),
        )
        .with_new_value(Some(task.title().to_string()));
        self.tasks.create(&task, &entry).await?;
        info!(task_id = %task.id(), actor_id = %actor_id, "task created");

        if let Some(assignee_id) = task.assignee_id() {
            self.publish(TaskEvent::Assigned {
                task: task.clone(),
                assignee_id,
                actor: Actor::User(actor_id),
            })
            .await;
        }
        Ok(task)
    }

    /// Moves a task along a permitted status edge.
    ///
    /// Workers may only move tasks assigned to them. Cancelling through this
    /// path is admin-only, and `Overdue` is reserved for the deadline sweep.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::Forbidden`], or
    /// [`TaskLifecycleError::Domain`] for edges outside the status machine.
    pub async fn change_status(
        &self,
        task_id: TaskId,
        new_status: TaskStatus,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let mut task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::ChangeStatus)?;
        if new_status == TaskStatus::Cancelled {
            authorize(&actor, Some(&task), TaskOperation::Cancel)?;
        }
        if new_status == TaskStatus::Overdue {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id,
                from: task.status(),
                to: new_status,
            }
            .into());
        }

        let old_status = task.transition_to(new_status, &*self.clock)?;
        self.commit_status(task, old_status, HistoryAction::StatusChanged, Actor::User(actor_id))
            .await
    }

    /// Sets any status on behalf of an admin, bypassing the status machine.
    ///
    /// Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn force_status(
        &self,
        task_id: TaskId,
        new_status: TaskStatus,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let mut task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::ForceStatus)?;

        let Some(old_status) = task.force_status(new_status, &*self.clock) else {
            return Ok(task);
        };
        warn!(
            task_id = %task_id,
            actor_id = %actor_id,
            from = %old_status,
            to = %new_status,
            "status forced outside the status machine"
        );
        self.commit_status(task, old_status, HistoryAction::StatusForced, Actor::User(actor_id))
            .await
    }

    /// Cancels a task on behalf of an admin.
    ///
    /// Cancelling works from every status, including completed tasks, and
    /// cancelling a cancelled task succeeds without recording anything.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn cancel(&self, task_id: TaskId, actor_id: UserId) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let mut task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::Cancel)?;

        let Some(old_status) = task.cancel(&*self.clock) else {
            debug!(task_id = %task_id, "task already cancelled");
            return Ok(task);
        };
        self.commit_status(task, old_status, HistoryAction::StatusChanged, Actor::User(actor_id))
            .await
    }

    /// Replaces the assignee on behalf of an admin.
    ///
    /// Assigning the current assignee again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::UserNotFound`], or
    /// [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn reassign(
        &self,
        task_id: TaskId,
        new_assignee_id: UserId,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let mut task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::Reassign)?;
        self.require_user(new_assignee_id).await?;

        let Some(previous) = task.assign(Some(new_assignee_id), &*self.clock) else {
            return Ok(task);
        };
        let entry = TaskHistoryEntry::new(
            task_id,
            Actor::User(actor_id),
            HistoryAction::Assigned,
            task.updated_at(),
        )
        .with_old_value(previous.map(|id| id.to_string()))
        .with_new_value(Some(new_assignee_id.to_string()));
        self.tasks.reassign(&task, &entry).await?;
        info!(task_id = %task_id, assignee_id = %new_assignee_id, "task reassigned");

        self.publish(TaskEvent::Assigned {
            task: task.clone(),
            assignee_id: new_assignee_id,
            actor: Actor::User(actor_id),
        })
        .await;
        Ok(task)
    }

    /// Applies typed field edits on behalf of an admin.
    ///
    /// Each field whose value actually changes gets its own history entry;
    /// unchanged fields are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::UserNotFound`] for an unknown new assignee, or
    /// [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn update_fields(
        &self,
        task_id: TaskId,
        changes: TaskChanges,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let mut task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::UpdateFields)?;
        if let Some(Some(assignee)) = changes.assignee {
            self.require_user(assignee).await?;
        }

        let previous_assignee = task.assignee_id();
        let applied = task.apply_changes(changes, &*self.clock);
        if applied.is_empty() {
            return Ok(task);
        }
        let entries: Vec<TaskHistoryEntry> = applied
            .into_iter()
            .map(|change| {
                TaskHistoryEntry::new(
                    task_id,
                    Actor::User(actor_id),
                    change.action,
                    task.updated_at(),
                )
                .with_old_value(change.old_value)
                .with_new_value(change.new_value)
            })
            .collect();
        self.tasks.update_fields(&task, &entries).await?;
        info!(task_id = %task_id, fields = entries.len(), "task fields updated");

        if let Some(assignee_id) = task.assignee_id().filter(|id| Some(*id) != previous_assignee) {
            self.publish(TaskEvent::Assigned {
                task: task.clone(),
                assignee_id,
                actor: Actor::User(actor_id),
            })
            .await;
        }
        Ok(task)
    }

    /// Parses loosely keyed edits and applies the valid ones.
    ///
    /// Unknown keys and unparseable values are returned in
    /// [`FieldUpdateOutcome::rejected`] and never block the other edits.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::update_fields`].
    pub async fn update_fields_from_pairs<'a, I>(
        &self,
        task_id: TaskId,
        edits: I,
        actor_id: UserId,
    ) -> TaskLifecycleResult<FieldUpdateOutcome>
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Send,
    {
        let parsed = FieldEdits::parse(
            edits,
            self.settings.limits,
            &self.settings.deadline_parser,
            self.clock.utc(),
        );
        for rejected in &parsed.rejected {
            debug!(task_id = %task_id, key = %rejected.key, reason = %rejected.reason, "edit skipped");
        }
        let task = self.update_fields(task_id, parsed.changes, actor_id).await?;
        Ok(FieldUpdateOutcome {
            task,
            rejected: parsed.rejected,
        })
    }

    /// Marks a task overdue on behalf of the system.
    ///
    /// Returns `None` when the task is already overdue.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::Domain`] when the task is completed or cancelled.
    pub async fn mark_overdue(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        let mut task = self.load_task(task_id).await?;
        if task.status() == TaskStatus::Overdue {
            return Ok(None);
        }
        let old_status = task.transition_to(TaskStatus::Overdue, &*self.clock)?;
        self.commit_status(task, old_status, HistoryAction::StatusChanged, Actor::System)
            .await
            .map(Some)
    }

    /// Returns a task the actor may view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::Forbidden`] when a worker asks for someone
    /// else's task.
    pub async fn get_task(&self, task_id: TaskId, actor_id: UserId) -> TaskLifecycleResult<Task> {
        let actor = self.load_actor(actor_id).await?;
        let task = self.load_task(task_id).await?;
        authorize(&actor, Some(&task), TaskOperation::View)?;
        Ok(task)
    }

    /// Returns the history of a task the actor may view, oldest first.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::get_task`].
    pub async fn task_history(
        &self,
        task_id: TaskId,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Vec<TaskHistoryEntry>> {
        self.get_task(task_id, actor_id).await?;
        Ok(self.tasks.list_history(task_id).await?)
    }

    /// Returns tasks assigned to the actor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_my_tasks(
        &self,
        actor_id: UserId,
        status: Option<TaskStatus>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.list_by_assignee(actor_id, status).await?)
    }

    /// Returns every task for an admin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn list_all_tasks(
        &self,
        actor_id: UserId,
        status: Option<TaskStatus>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let actor = self.load_actor(actor_id).await?;
        authorize(&actor, None, TaskOperation::ListAll)?;
        Ok(self.tasks.list_all(status).await?)
    }

    /// Searches tasks for an admin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Forbidden`] for workers.
    pub async fn search_tasks(
        &self,
        query: &TaskQuery,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let actor = self.load_actor(actor_id).await?;
        authorize(&actor, None, TaskOperation::ListAll)?;
        Ok(self.tasks.search(query).await?)
    }

    /// Returns tasks the deadline sweep should inspect.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn overdue_candidates(&self, now: DateTime<Utc>) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.list_past_deadline(now).await?)
    }

    /// Loads a task for a background service, without an access check.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.tasks.find_by_id(task_id).await?)
    }

    /// Returns active tasks with a deadline and an assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn reminder_candidates(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.list_reminder_candidates().await?)
    }

    async fn commit_status(
        &self,
        task: Task,
        old_status: TaskStatus,
        action: HistoryAction,
        actor: Actor,
    ) -> TaskLifecycleResult<Task> {
        let new_status = task.status();
        let entry = TaskHistoryEntry::new(task.id(), actor, action, task.updated_at())
            .with_old_value(Some(old_status.as_str().to_owned()))
            .with_new_value(Some(new_status.as_str().to_owned()));
        self.tasks.update_status(&task, &entry).await?;
        info!(task_id = %task.id(), from = %old_status, to = %new_status, "task status changed");

        self.publish(TaskEvent::StatusChanged {
            task: task.clone(),
            old_status,
            new_status,
            actor,
        })
        .await;
        Ok(task)
    }

    async fn publish(&self, event: TaskEvent) {
        if let Err(err) = self.events.publish(&event).await {
            warn!(
                task_id = %event.task().id(),
                event = event.name(),
                error = %err,
                "task event delivery failed"
            );
        }
    }

    async fn load_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn load_actor(&self, actor_id: UserId) -> TaskLifecycleResult<User> {
        self.users
            .find_by_id(actor_id)
            .await?
            .ok_or(TaskLifecycleError::UserNotFound(actor_id))
    }

    async fn require_user(&self, user_id: UserId) -> TaskLifecycleResult<()> {
        self.load_actor(user_id).await.map(|_| ())
    }
}

fn authorize(
    actor: &User,
    task: Option<&Task>,
    operation: TaskOperation,
) -> TaskLifecycleResult<()> {
    if can_modify(actor, task, operation) {
        return Ok(());
    }
    debug!(actor_id = %actor.id(), %operation, "operation refused");
    Err(TaskLifecycleError::Forbidden {
        actor_id: actor.id(),
        operation,
    })
}
