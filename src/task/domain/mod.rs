//! Domain model for task lifecycle management.
//!
//! Tasks move through a small status machine. Every status or assignee
//! mutation yields a [`TaskHistoryEntry`] that the repository persists in the
//! same unit of work as the task row.

mod changes;
mod error;
mod events;
mod history;
mod ids;
mod status;
mod task;
mod text;

pub use changes::{FieldChange, TaskChanges};
pub use error::{
    ParseHistoryActionError, ParsePriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use events::TaskEvent;
pub use history::{Actor, HistoryAction, TaskHistoryEntry};
pub use ids::TaskId;
pub use status::{TaskPriority, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task};
pub use text::{TaskDescription, TaskTitle, TextLimits};
