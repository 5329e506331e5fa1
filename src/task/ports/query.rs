//! Search filters and listing order shared by task repositories.

use crate::task::domain::{Task, TaskPriority, TaskStatus};
use crate::user::domain::UserId;
use std::cmp::Ordering;

/// Filter for task search.
///
/// Every populated field narrows the result. `text` matches the title or
/// description case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Substring to look for.
    pub text: Option<String>,
    /// Required status.
    pub status: Option<TaskStatus>,
    /// Required priority.
    pub priority: Option<TaskPriority>,
    /// Required assignee.
    pub assignee_id: Option<UserId>,
    /// Required creator.
    pub creator_id: Option<UserId>,
    /// Maximum number of results.
    pub limit: usize,
    /// Number of ordered results to skip.
    pub offset: usize,
}

impl TaskQuery {
    /// Default page size for searches.
    pub const DEFAULT_LIMIT: usize = 50;

    /// Creates an unfiltered query with the default page size.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: None,
            status: None,
            priority: None,
            assignee_id: None,
            creator_id: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Restricts results to tasks whose title or description contains
    /// `text`. Blank text is ignored.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let value = text.into();
        self.text = (!value.trim().is_empty()).then(|| value.trim().to_owned());
        self
    }

    /// Restricts results to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to one priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts results to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Restricts results to one creator.
    #[must_use]
    pub const fn with_creator(mut self, creator_id: UserId) -> Self {
        self.creator_id = Some(creator_id);
        self
    }

    /// Sets paging.
    #[must_use]
    pub const fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Returns `true` when `task` satisfies every populated filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self
                .assignee_id
                .is_none_or(|assignee| task.is_assigned_to(assignee))
            && self
                .creator_id
                .is_none_or(|creator| task.creator_id() == creator)
            && self.text.as_deref().is_none_or(|text| text_matches(task, text))
    }
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self::new()
    }
}

fn text_matches(task: &Task, needle: &str) -> bool {
    let lowered = needle.to_lowercase();
    task.title().as_str().to_lowercase().contains(&lowered)
        || task
            .description()
            .is_some_and(|description| description.as_str().to_lowercase().contains(&lowered))
}

/// Ordering used by every task listing: earliest deadline first, tasks
/// without a deadline last, then newest first.
#[must_use]
pub fn listing_order(left: &Task, right: &Task) -> Ordering {
    match (left.deadline(), right.deadline()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| right.created_at().cmp(&left.created_at()))
}
