//! Task aggregate root.

use super::{
    FieldChange, HistoryAction, TaskChanges, TaskDescription, TaskDomainError, TaskId,
    TaskPriority, TaskStatus, TaskTitle,
};
use crate::user::domain::UserId;
use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// `completed_at` is populated exactly when the status is
/// [`TaskStatus::Completed`]; all status writes share one private setter
/// that maintains it. `revision` grows by one for
/// each persisted mutation and backs optimistic concurrency in repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<TaskDescription>,
    creator_id: UserId,
    assignee_id: Option<UserId>,
    status: TaskStatus,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    revision: u64,
}

/// Validated input for a fresh task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title.
    pub title: TaskTitle,
    /// Optional description.
    pub description: Option<TaskDescription>,
    /// Creating admin.
    pub creator_id: UserId,
    /// Initial assignee.
    pub assignee_id: Option<UserId>,
    /// Priority.
    pub priority: TaskPriority,
    /// Deadline as a UTC instant.
    pub deadline: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<TaskDescription>,
    /// Persisted creator.
    pub creator_id: UserId,
    /// Persisted assignee.
    pub assignee_id: Option<UserId>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted revision counter.
    pub revision: u64,
}

impl Task {
    /// Creates a new task in [`TaskStatus::New`].
    #[must_use]
    pub fn create(draft: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            creator_id: draft.creator_id,
            assignee_id: draft.assignee_id,
            status: TaskStatus::New,
            priority: draft.priority,
            deadline: draft.deadline,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
            revision: 0,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            creator_id: data.creator_id,
            assignee_id: data.assignee_id,
            status: data.status,
            priority: data.priority,
            deadline: data.deadline,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
            revision: data.revision,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the revision counter.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` when `user_id` is the assignee.
    #[must_use]
    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignee_id == Some(user_id)
    }

    /// Returns `true` when the deadline is strictly before `now`.
    #[must_use]
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Moves the task along a permitted status edge.
    ///
    /// Returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the edge is
    /// not part of the status machine.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<TaskStatus, TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        Ok(self.set_status(target, clock))
    }

    /// Sets any status without consulting the status machine.
    ///
    /// Returns the previous status, or `None` when the task already has
    /// `target`.
    pub fn force_status(&mut self, target: TaskStatus, clock: &impl Clock) -> Option<TaskStatus> {
        (self.status != target).then(|| self.set_status(target, clock))
    }

    /// Cancels the task from any status.
    ///
    /// Returns the previous status, or `None` when the task is already
    /// cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> Option<TaskStatus> {
        self.force_status(TaskStatus::Cancelled, clock)
    }

    /// Replaces the assignee.
    ///
    /// Returns the previous assignee when it changed.
    pub fn assign(
        &mut self,
        assignee_id: Option<UserId>,
        clock: &impl Clock,
    ) -> Option<Option<UserId>> {
        if self.assignee_id == assignee_id {
            return None;
        }
        let previous = std::mem::replace(&mut self.assignee_id, assignee_id);
        self.touch(clock);
        Some(previous)
    }

    /// Applies field edits and reports each field whose value changed.
    ///
    /// Edits that leave a field unchanged are skipped. The revision grows by
    /// one when anything changed.
    pub fn apply_changes(&mut self, changes: TaskChanges, clock: &impl Clock) -> Vec<FieldChange> {
        let mut applied = Vec::new();

        if let Some(title) = changes.title.filter(|candidate| *candidate != self.title) {
            let old = std::mem::replace(&mut self.title, title);
            applied.push(FieldChange {
                action: HistoryAction::TitleUpdated,
                old_value: Some(old.to_string()),
                new_value: Some(self.title.to_string()),
            });
        }

        if let Some(description) = changes
            .description
            .filter(|candidate| *candidate != self.description)
        {
            let old = std::mem::replace(&mut self.description, description);
            applied.push(FieldChange {
                action: HistoryAction::DescriptionUpdated,
                old_value: old.map(|text| text.to_string()),
                new_value: self.description.as_ref().map(ToString::to_string),
            });
        }

        if let Some(priority) = changes.priority.filter(|candidate| *candidate != self.priority) {
            let old = std::mem::replace(&mut self.priority, priority);
            applied.push(FieldChange {
                action: HistoryAction::PriorityUpdated,
                old_value: Some(old.as_str().to_owned()),
                new_value: Some(priority.as_str().to_owned()),
            });
        }

        if let Some(deadline) = changes.deadline.filter(|candidate| *candidate != self.deadline) {
            let old = std::mem::replace(&mut self.deadline, deadline);
            applied.push(FieldChange {
                action: HistoryAction::DeadlineUpdated,
                old_value: old.map(render_instant),
                new_value: deadline.map(render_instant),
            });
        }

        if let Some(assignee) = changes.assignee.filter(|candidate| *candidate != self.assignee_id) {
            let old = std::mem::replace(&mut self.assignee_id, assignee);
            applied.push(FieldChange {
                action: HistoryAction::Assigned,
                old_value: old.map(|id| id.to_string()),
                new_value: assignee.map(|id| id.to_string()),
            });
        }

        if !applied.is_empty() {
            self.touch(clock);
        }
        applied
    }

    fn set_status(&mut self, target: TaskStatus, clock: &impl Clock) -> TaskStatus {
        let previous = std::mem::replace(&mut self.status, target);
        self.touch(clock);
        self.completed_at = (target == TaskStatus::Completed).then_some(self.updated_at);
        previous
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.revision += 1;
    }
}

/// Renders an instant for history values.
pub(crate) fn render_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
