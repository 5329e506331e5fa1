//! Step-by-step task draft collected over a conversation.

use super::FormError;
use crate::local_time::DeadlineParser;
use crate::task::domain::{TaskDescription, TaskPriority, TaskTitle, TextLimits};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input that skips an optional step.
pub const SKIP: &str = "-";

const SKIP_WORDS: [&str; 3] = [SKIP, "skip", "пропустить"];
const CANCEL_WORDS: [&str; 2] = ["cancel", "отмена"];

/// Position of a draft in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormStep {
    /// Waiting for the title.
    #[default]
    Title,
    /// Waiting for the optional description.
    Description,
    /// Waiting for the priority.
    Priority,
    /// Waiting for the optional deadline.
    Deadline,
    /// Waiting for the optional assignee.
    Assignee,
    /// Every field is collected.
    Ready,
}

/// A selectable assignee offered at the assignee step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeChoice {
    /// User to assign.
    pub user_id: UserId,
    /// Label shown in the prompt.
    pub name: String,
}

/// Inputs the form needs besides the typed text.
#[derive(Debug, Clone, Copy)]
pub struct FormContext<'a> {
    /// Title and description limits.
    pub limits: TextLimits,
    /// Parser for deadline text.
    pub parser: DeadlineParser,
    /// Reference instant for relative deadlines.
    pub now: DateTime<Utc>,
    /// Candidates listed at the assignee step, numbered from 1.
    pub assignees: &'a [AssigneeChoice],
}

/// Result of feeding one input to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The input was accepted; the form moved to its next step.
    Advanced(TaskDraftForm),
    /// The input was rejected; the form is unchanged.
    Rejected {
        /// The unchanged form.
        form: TaskDraftForm,
        /// Why the input was rejected.
        error: FormError,
    },
    /// The user abandoned the form.
    Cancelled,
}

impl Transition {
    /// Returns the form to keep, or `None` once cancelled.
    #[must_use]
    pub const fn form(&self) -> Option<&TaskDraftForm> {
        match self {
            Self::Advanced(form) | Self::Rejected { form, .. } => Some(form),
            Self::Cancelled => None,
        }
    }
}

/// A task draft and the step it is waiting on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraftForm {
    step: FormStep,
    title: Option<TaskTitle>,
    description: Option<TaskDescription>,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
    assignee_id: Option<UserId>,
}

impl TaskDraftForm {
    /// Starts an empty draft at the title step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the step the draft is waiting on.
    #[must_use]
    pub const fn step(&self) -> FormStep {
        self.step
    }

    /// Returns `true` once every step is answered.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.step, FormStep::Ready)
    }

    /// Returns the collected title.
    #[must_use]
    pub const fn title(&self) -> Option<&TaskTitle> {
        self.title.as_ref()
    }

    /// Returns the collected description.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns the chosen priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the chosen deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the chosen assignee.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    /// Renders the question for the current step.
    #[must_use]
    pub fn prompt(&self, context: &FormContext<'_>) -> String {
        match self.step {
            FormStep::Title => format!(
                "Enter the task title (up to {} characters):",
                context.limits.max_title_chars
            ),
            FormStep::Description => format!(
                "Enter a description (up to {} characters) or '{SKIP}' to skip:",
                context.limits.max_description_chars
            ),
            FormStep::Priority => "Choose a priority: high, medium or low.".to_owned(),
            FormStep::Deadline => format!(
                "Enter a deadline such as 25.12.2026 18:00, tomorrow or in 3 days, \
                 or '{SKIP}' for none:"
            ),
            FormStep::Assignee => assignee_prompt(context.assignees),
            FormStep::Ready => "The draft is complete.".to_owned(),
        }
    }

    fn apply(&self, input: &str, context: &FormContext<'_>) -> Result<Self, FormError> {
        let mut next = self.clone();
        match self.step {
            FormStep::Title => {
                next.title = Some(TaskTitle::new(input, context.limits)?);
                next.step = FormStep::Description;
            }
            FormStep::Description => {
                next.description = if is_skip(input) {
                    None
                } else {
                    TaskDescription::new(input, context.limits)?
                };
                next.step = FormStep::Priority;
            }
            FormStep::Priority => {
                next.priority = TaskPriority::try_from(input)?;
                next.step = FormStep::Deadline;
            }
            FormStep::Deadline => {
                next.deadline = if is_skip(input) {
                    None
                } else {
                    Some(context.parser.parse(input, context.now)?)
                };
                next.step = FormStep::Assignee;
            }
            FormStep::Assignee => {
                next.assignee_id = pick_assignee(input, context.assignees)?;
                next.step = FormStep::Ready;
            }
            FormStep::Ready => return Err(FormError::Complete),
        }
        Ok(next)
    }
}

/// Feeds one user input to `form`.
///
/// Cancel words abandon the form from any step. Rejected input leaves the
/// form untouched so the caller can repeat the same prompt.
#[must_use]
pub fn advance(form: TaskDraftForm, input: &str, context: &FormContext<'_>) -> Transition {
    let trimmed = input.trim();
    if matches_any(trimmed, &CANCEL_WORDS) {
        return Transition::Cancelled;
    }
    match form.apply(trimmed, context) {
        Ok(next) => Transition::Advanced(next),
        Err(error) => Transition::Rejected { form, error },
    }
}

fn is_skip(input: &str) -> bool {
    matches_any(input, &SKIP_WORDS)
}

fn matches_any(input: &str, words: &[&str]) -> bool {
    let lowered = input.to_lowercase();
    words.iter().any(|word| *word == lowered)
}

fn pick_assignee(input: &str, choices: &[AssigneeChoice]) -> Result<Option<UserId>, FormError> {
    if is_skip(input) {
        return Ok(None);
    }
    let by_number = input
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| choices.get(index));
    let chosen = by_number.or_else(|| {
        choices
            .iter()
            .find(|choice| choice.name.eq_ignore_ascii_case(input))
    });
    chosen
        .map(|choice| Some(choice.user_id))
        .ok_or_else(|| FormError::UnknownAssignee(input.to_owned()))
}

fn assignee_prompt(choices: &[AssigneeChoice]) -> String {
    let header = format!("Choose an assignee by number, or '{SKIP}' to leave it unassigned:");
    std::iter::once(header)
        .chain(
            (1_usize..)
                .zip(choices)
                .map(|(number, choice)| format!("{number}. {}", choice.name)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}
