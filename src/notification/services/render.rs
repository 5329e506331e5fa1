//! Message bodies for notifications.

use crate::local_time::{DisplayOffset, DisplayStyle, UNSPECIFIED};
use crate::task::domain::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Language of notification bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// English text.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Russian text.
    #[serde(rename = "ru")]
    Russian,
}

struct Catalog {
    card: &'static str,
    overdue: &'static str,
    reminder: &'static str,
    assignment: &'static str,
    completed: &'static str,
    unspecified: &'static str,
}

const ENGLISH: Catalog = Catalog {
    card: "\u{1f4dd} {{ title }}\n\
{% if description %}{{ description }}\n{% endif %}\
Priority: {{ priority }}\n\
Status: {{ status }}\n\
Deadline: {{ deadline }}",
    overdue: "\u{26a0}\u{fe0f} TASK OVERDUE\n\n{{ card }}\n\n\
Please update the task status or contact your manager.",
    reminder: "{{ urgency }} DEADLINE APPROACHING\n\n\
\u{23f0} {{ lead_hours }} hours left until the deadline.\n\n{{ card }}",
    assignment: "\u{1f195} NEW TASK ASSIGNED\n\n{{ card }}\n\n\
The task is waiting for you.",
    completed: "\u{2705} TASK COMPLETED\n\n{{ card }}\n\n\
Completed at: {{ completed_at }}",
    unspecified: UNSPECIFIED,
};

const RUSSIAN: Catalog = Catalog {
    card: "\u{1f4dd} {{ title }}\n\
{% if description %}{{ description }}\n{% endif %}\
Приоритет: {{ priority }}\n\
Статус: {{ status }}\n\
Дедлайн: {{ deadline }}",
    overdue: "\u{26a0}\u{fe0f} ЗАДАЧА ПРОСРОЧЕНА!\n\n{{ card }}\n\n\
Пожалуйста, обновите статус задачи или свяжитесь с руководителем.",
    reminder: "{{ urgency }} ДЕДЛАЙН ПРИБЛИЖАЕТСЯ\n\n\
\u{23f0} До завершения задачи осталось: {{ lead_hours }} ч.\n\n{{ card }}",
    assignment: "\u{1f195} НОВАЯ ЗАДАЧА НАЗНАЧЕНА\n\n{{ card }}\n\n\
Задача ожидает выполнения.",
    completed: "\u{2705} ЗАДАЧА ВЫПОЛНЕНА\n\n{{ card }}\n\n\
Выполнено: {{ completed_at }}",
    unspecified: "Не указано",
};

impl Locale {
    const fn catalog(self) -> &'static Catalog {
        match self {
            Self::English => &ENGLISH,
            Self::Russian => &RUSSIAN,
        }
    }

    const fn status(self, status: TaskStatus) -> &'static str {
        match (self, status) {
            (Self::English, _) => status.as_str(),
            (Self::Russian, TaskStatus::New) => "Новая",
            (Self::Russian, TaskStatus::InProgress) => "В работе",
            (Self::Russian, TaskStatus::Completed) => "Выполнена",
            (Self::Russian, TaskStatus::Overdue) => "Просрочена",
            (Self::Russian, TaskStatus::Cancelled) => "Отменена",
        }
    }

    const fn priority(self, priority: TaskPriority) -> &'static str {
        match (self, priority) {
            (Self::English, _) => priority.as_str(),
            (Self::Russian, TaskPriority::Low) => "Низкий",
            (Self::Russian, TaskPriority::Medium) => "Средний",
            (Self::Russian, TaskPriority::High) => "Высокий",
        }
    }
}

/// Error raised when a message template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template} message: {reason}")]
pub struct RenderError {
    /// Template name.
    pub template: &'static str,
    /// Renderer message.
    pub reason: String,
}

/// Renders notification bodies with timestamps in the display offset.
#[derive(Debug, Clone, Default)]
pub struct MessageRenderer {
    offset: DisplayOffset,
    locale: Locale,
}

impl MessageRenderer {
    /// Creates an English renderer for the given display offset.
    #[must_use]
    pub const fn new(offset: DisplayOffset) -> Self {
        Self {
            offset,
            locale: Locale::English,
        }
    }

    /// Switches the language of rendered messages.
    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Renders the alert sent once a task misses its deadline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template cannot be rendered.
    pub fn overdue(&self, task: &Task) -> Result<String, RenderError> {
        let context = self.with_card(task)?;
        render("overdue", self.locale.catalog().overdue, context)
    }

    /// Renders a reminder sent `lead_hours` before the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template cannot be rendered.
    pub fn reminder(&self, task: &Task, lead_hours: u32) -> Result<String, RenderError> {
        let mut context = self.with_card(task)?;
        context.insert("lead_hours".to_owned(), Value::from(lead_hours));
        context.insert(
            "urgency".to_owned(),
            Value::String(urgency_marker(lead_hours).to_owned()),
        );
        render("reminder", self.locale.catalog().reminder, context)
    }

    /// Renders the notice sent to a new assignee.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template cannot be rendered.
    pub fn assignment(&self, task: &Task) -> Result<String, RenderError> {
        let context = self.with_card(task)?;
        render("assignment", self.locale.catalog().assignment, context)
    }

    /// Renders the notice sent to the creator of a finished task.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template cannot be rendered.
    pub fn completed(&self, task: &Task) -> Result<String, RenderError> {
        let mut context = self.with_card(task)?;
        context.insert(
            "completed_at".to_owned(),
            Value::String(self.timestamp(task.completed_at())),
        );
        render("completed", self.locale.catalog().completed, context)
    }

    fn with_card(&self, task: &Task) -> Result<Map<String, Value>, RenderError> {
        let card = render("task card", self.locale.catalog().card, self.task_context(task))?;
        let mut context = Map::new();
        context.insert("card".to_owned(), Value::String(card));
        Ok(context)
    }

    fn task_context(&self, task: &Task) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert("title".to_owned(), Value::String(task.title().to_string()));
        context.insert(
            "description".to_owned(),
            task.description()
                .map_or(Value::Null, |text| Value::String(text.to_string())),
        );
        context.insert(
            "priority".to_owned(),
            Value::from(self.locale.priority(task.priority())),
        );
        context.insert(
            "status".to_owned(),
            Value::from(self.locale.status(task.status())),
        );
        context.insert(
            "deadline".to_owned(),
            Value::String(self.timestamp(task.deadline())),
        );
        context
    }

    fn timestamp(&self, instant: Option<DateTime<Utc>>) -> String {
        instant.map_or_else(
            || self.locale.catalog().unspecified.to_owned(),
            |value| self.offset.format(Some(value), DisplayStyle::DateTime),
        )
    }
}

const fn urgency_marker(lead_hours: u32) -> &'static str {
    match lead_hours {
        0..=1 => "\u{1f525}",
        2..=6 => "\u{26a0}\u{fe0f}",
        _ => "\u{1f559}",
    }
}

fn render(
    template: &'static str,
    source: &str,
    context: Map<String, Value>,
) -> Result<String, RenderError> {
    let environment = Environment::new();
    environment
        .render_str(source, context)
        .map_err(|error| RenderError {
            template,
            reason: error.to_string(),
        })
}
