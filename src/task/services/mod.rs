//! Application services for task lifecycle orchestration.

mod authorization;
mod edits;
mod lifecycle;

pub use authorization::{TaskOperation, can_modify};
pub use edits::{FieldEdits, RejectReason, RejectedField};
pub use lifecycle::{
    CreateTaskRequest, FieldUpdateOutcome, LifecycleSettings, TaskLifecycleError,
    TaskLifecycleResult, TaskLifecycleService,
};
