//! Authorization predicate for task operations.

use crate::task::domain::Task;
use crate::user::domain::User;
use std::fmt;

/// Operation a user asks to perform on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    /// Create a task.
    Create,
    /// Read a task or its history.
    View,
    /// Move a task along the status machine.
    ChangeStatus,
    /// Override the status machine.
    ForceStatus,
    /// Replace the assignee.
    Reassign,
    /// Edit task fields.
    UpdateFields,
    /// Cancel a task.
    Cancel,
    /// List or search every task.
    ListAll,
}

impl TaskOperation {
    /// Returns the operation name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::ChangeStatus => "change_status",
            Self::ForceStatus => "force_status",
            Self::Reassign => "reassign",
            Self::UpdateFields => "update_fields",
            Self::Cancel => "cancel",
            Self::ListAll => "list_all",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `actor` may perform `operation`.
///
/// Admins may do everything. Workers may only view tasks assigned to them
/// and move those tasks through the status machine; operations without a
/// task in scope (`task == None`) are admin-only.
#[must_use]
pub fn can_modify(actor: &User, task: Option<&Task>, operation: TaskOperation) -> bool {
    if actor.is_admin() {
        return true;
    }
    match operation {
        TaskOperation::View | TaskOperation::ChangeStatus => {
            task.is_some_and(|scoped| scoped.is_assigned_to(actor.id()))
        }
        TaskOperation::Create
        | TaskOperation::ForceStatus
        | TaskOperation::Reassign
        | TaskOperation::UpdateFields
        | TaskOperation::Cancel
        | TaskOperation::ListAll => false,
    }
}
