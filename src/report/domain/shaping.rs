//! Chart-ready aggregations over task lists.

use super::{TaskCounts, UserDirectory};
use crate::task::domain::{Task, TaskId, TaskPriority, TaskStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Number of tasks in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// Status.
    pub status: TaskStatus,
    /// Tasks in that status.
    pub count: usize,
}

/// Number of tasks with one priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    /// Priority.
    pub priority: TaskPriority,
    /// Tasks with that priority.
    pub count: usize,
}

/// Per-assignee performance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeRow {
    /// Assignee, or `None` for unassigned tasks.
    pub assignee_id: Option<UserId>,
    /// Display label.
    pub name: String,
    /// Counters over the assignee's tasks.
    pub counts: TaskCounts,
}

/// One bar of a Gantt chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GanttRow {
    /// Task identifier.
    pub task_id: TaskId,
    /// Title.
    pub title: String,
    /// Status, for colouring.
    pub status: TaskStatus,
    /// Bar start: task creation.
    pub start: DateTime<Utc>,
    /// Bar end: completion, or the deadline while unfinished.
    pub end: DateTime<Utc>,
}

/// Non-empty status buckets in workflow order.
#[must_use]
pub fn status_distribution(tasks: &[Task]) -> Vec<StatusCount> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: tasks.iter().filter(|task| task.status() == status).count(),
        })
        .filter(|bucket| bucket.count > 0)
        .collect()
}

/// Counts per priority, highest first, including empty ones.
#[must_use]
pub fn priority_distribution(tasks: &[Task]) -> Vec<PriorityCount> {
    [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low]
        .into_iter()
        .map(|priority| PriorityCount {
            priority,
            count: tasks
                .iter()
                .filter(|task| task.priority() == priority)
                .count(),
        })
        .collect()
}

/// Groups tasks by assignee, ordered by label.
#[must_use]
pub fn assignee_rows(tasks: &[Task], directory: &UserDirectory) -> Vec<AssigneeRow> {
    let mut groups: HashMap<Option<UserId>, Vec<&Task>> = HashMap::new();
    for task in tasks {
        groups.entry(task.assignee_id()).or_default().push(task);
    }
    let mut rows: Vec<AssigneeRow> = groups
        .into_iter()
        .map(|(assignee_id, group)| AssigneeRow {
            assignee_id,
            name: directory.label(assignee_id),
            counts: TaskCounts::tally(group),
        })
        .collect();
    rows.sort_by(|left, right| left.name.cmp(&right.name));
    rows
}

/// Gantt bars for tasks with a deadline, earliest start first.
#[must_use]
pub fn gantt_rows(tasks: &[Task]) -> Vec<GanttRow> {
    let mut rows: Vec<GanttRow> = tasks
        .iter()
        .filter_map(|task| {
            let deadline = task.deadline()?;
            Some(GanttRow {
                task_id: task.id(),
                title: task.title().to_string(),
                status: task.status(),
                start: task.created_at(),
                end: task.completed_at().unwrap_or(deadline),
            })
        })
        .collect();
    rows.sort_by_key(|row| row.start);
    rows
}
