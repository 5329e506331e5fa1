//! The assembled report handed to renderers.

use super::{
    AssigneeRow, GanttRow, GeneralStats, PriorityCount, StatusCount, TaskSnapshot, UserDirectory,
    assignee_rows, gantt_rows, general_stats, priority_distribution, status_distribution,
};
use crate::task::domain::Task;
use crate::user::domain::User;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a renderer needs to draw a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Organisation-wide counters over the selected tasks.
    pub summary: GeneralStats,
    /// Completion rate of the selected tasks, in percent.
    pub completion_rate: f64,
    /// Non-empty status buckets.
    pub statuses: Vec<StatusCount>,
    /// Priority buckets.
    pub priorities: Vec<PriorityCount>,
    /// Per-assignee rows.
    pub assignees: Vec<AssigneeRow>,
    /// Gantt bars.
    pub timeline: Vec<GanttRow>,
    /// Flat task rows.
    pub tasks: Vec<TaskSnapshot>,
}

impl ReportData {
    /// Shapes `tasks` into a report.
    ///
    /// `users` provides display names and the active-user count.
    #[must_use]
    pub fn assemble(tasks: &[Task], users: &[User], generated_at: DateTime<Utc>) -> Self {
        let directory = UserDirectory::new(users);
        let summary = general_stats(tasks, users);
        Self {
            generated_at,
            completion_rate: summary.completion_rate(),
            summary,
            statuses: status_distribution(tasks),
            priorities: priority_distribution(tasks),
            assignees: assignee_rows(tasks, &directory),
            timeline: gantt_rows(tasks),
            tasks: tasks
                .iter()
                .map(|task| TaskSnapshot::of(task, &directory))
                .collect(),
        }
    }
}
