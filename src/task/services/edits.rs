//! Parsing of loosely keyed field edits into typed task changes.

use crate::local_time::DeadlineParser;
use crate::task::domain::{TaskChanges, TaskDescription, TaskPriority, TaskTitle, TextLimits};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Words that clear an optional field.
const CLEAR_WORDS: [&str; 4] = ["", "none", "-", "нет"];

/// Why an edit was left out of the change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The key is not an editable field.
    UnknownField,
    /// The value could not be turned into the field type.
    InvalidValue(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField => f.write_str("unknown field"),
            Self::InvalidValue(reason) => write!(f, "invalid value: {reason}"),
        }
    }
}

/// Edit that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedField {
    /// Key as supplied.
    pub key: String,
    /// Why it was skipped.
    pub reason: RejectReason,
}

/// Result of parsing key/value edits: the valid subset plus what was
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEdits {
    /// Typed changes for every accepted key.
    pub changes: TaskChanges,
    /// Keys that were skipped.
    pub rejected: Vec<RejectedField>,
}

impl FieldEdits {
    /// Parses raw edits.
    ///
    /// Only `title`, `description`, `priority`, `deadline`, and `assignee`
    /// (alias `assignee_id`) are editable. Unknown keys and bad values are
    /// collected in [`FieldEdits::rejected`] without affecting the other
    /// edits.
    #[must_use]
    pub fn parse<'a, I>(
        edits: I,
        limits: TextLimits,
        parser: &DeadlineParser,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut parsed = Self::default();
        for (key, value) in edits {
            if let Err(reason) = parsed.accept(key, value, limits, parser, now) {
                parsed.rejected.push(RejectedField {
                    key: key.to_owned(),
                    reason,
                });
            }
        }
        parsed
    }

    fn accept(
        &mut self,
        key: &str,
        value: &str,
        limits: TextLimits,
        parser: &DeadlineParser,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        match key.trim().to_ascii_lowercase().as_str() {
            "title" => {
                self.changes.title =
                    Some(TaskTitle::new(value, limits).map_err(invalid_value)?);
            }
            "description" => {
                self.changes.description =
                    Some(TaskDescription::new(value, limits).map_err(invalid_value)?);
            }
            "priority" => {
                self.changes.priority =
                    Some(TaskPriority::try_from(value).map_err(invalid_value)?);
            }
            "deadline" => {
                let deadline = if is_clear_word(value) {
                    None
                } else {
                    Some(parser.parse(value, now).map_err(invalid_value)?)
                };
                self.changes.deadline = Some(deadline);
            }
            "assignee" | "assignee_id" => {
                let assignee = if is_clear_word(value) {
                    None
                } else {
                    let uuid = Uuid::parse_str(value.trim()).map_err(invalid_value)?;
                    Some(UserId::from_uuid(uuid))
                };
                self.changes.assignee = Some(assignee);
            }
            _ => return Err(RejectReason::UnknownField),
        }
        Ok(())
    }
}

fn invalid_value(err: impl fmt::Display) -> RejectReason {
    RejectReason::InvalidValue(err.to_string())
}

fn is_clear_word(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    CLEAR_WORDS.contains(&normalized.as_str())
}
