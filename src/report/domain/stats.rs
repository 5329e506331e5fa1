//! Task counters and completion rates.

use crate::task::domain::{Task, TaskStatus};
use crate::user::domain::{User, UserId};
use serde::Serialize;
use std::collections::HashSet;

/// Counts of tasks by lifecycle bucket.
///
/// `active` uses [`TaskStatus::is_active`], the same definition reminders
/// and listings use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    /// Every task counted.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Overdue tasks.
    pub overdue: usize,
    /// New or in-progress tasks.
    pub active: usize,
}

impl TaskCounts {
    /// Counts the given tasks.
    #[must_use]
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            counts.record(task.status());
            counts
        })
    }

    const fn record(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Overdue => self.overdue += 1,
            TaskStatus::New | TaskStatus::InProgress => self.active += 1,
            TaskStatus::Cancelled => {}
        }
    }

    /// Returns `completed / max(total, 1) * 100`.
    ///
    /// An empty set yields `0.0`.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        percent_of(self.completed, self.total.max(1))
    }
}

/// Counters for the tasks assigned to one user.
#[must_use]
pub fn user_stats(tasks: &[Task], user_id: UserId) -> TaskCounts {
    TaskCounts::tally(tasks.iter().filter(|task| task.is_assigned_to(user_id)))
}

/// Organisation-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeneralStats {
    /// Counters over every task.
    #[serde(flatten)]
    pub counts: TaskCounts,
    /// Users with at least one task assigned.
    pub distinct_assignees: usize,
    /// Active registered users.
    pub total_users: usize,
}

impl GeneralStats {
    /// Returns the completion rate over every task.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        self.counts.completion_rate()
    }
}

/// Builds organisation-wide counters.
#[must_use]
pub fn general_stats(tasks: &[Task], users: &[User]) -> GeneralStats {
    let distinct_assignees = tasks
        .iter()
        .filter_map(Task::assignee_id)
        .collect::<HashSet<_>>()
        .len();
    GeneralStats {
        counts: TaskCounts::tally(tasks),
        distinct_assignees,
        total_users: users.iter().filter(|user| user.is_active()).count(),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "completion rate is a percentage shown to users"
)]
fn percent_of(part: usize, whole: usize) -> f64 {
    let saturate = |value: usize| f64::from(u32::try_from(value).unwrap_or(u32::MAX));
    saturate(part) / saturate(whole) * 100.0
}
