//! Pure aggregation over task snapshots.

mod document;
mod shaping;
mod snapshot;
mod stats;

pub use document::ReportData;
pub use shaping::{
    AssigneeRow, GanttRow, PriorityCount, StatusCount, assignee_rows, gantt_rows,
    priority_distribution, status_distribution,
};
pub use snapshot::{TaskSnapshot, UNASSIGNED, UserDirectory, completion_days};
pub use stats::{GeneralStats, TaskCounts, general_stats, user_stats};
