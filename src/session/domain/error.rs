//! Reasons a form step rejected its input.

use crate::local_time::ParseFailure;
use crate::task::domain::{ParsePriorityError, TaskDomainError};
use thiserror::Error;

/// Input rejected by the current form step.
///
/// Rejections are recoverable: the form stays on the same step and the
/// caller re-prompts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    /// Title or description failed validation.
    #[error(transparent)]
    Text(#[from] TaskDomainError),

    /// The priority was not recognised.
    #[error(transparent)]
    Priority(#[from] ParsePriorityError),

    /// The deadline could not be parsed.
    #[error(transparent)]
    Deadline(#[from] ParseFailure),

    /// The assignee choice does not name a listed candidate.
    #[error("no assignee matches '{0}'")]
    UnknownAssignee(String),

    /// The form is already complete.
    #[error("the draft is complete and awaits submission")]
    Complete,
}
