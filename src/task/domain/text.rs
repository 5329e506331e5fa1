//! Length-limited task text fields.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character limits for task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLimits {
    /// Maximum title length in characters.
    pub max_title_chars: usize,
    /// Maximum description length in characters.
    pub max_description_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_title_chars: 100,
            max_description_chars: 500,
        }
    }
}

/// Trimmed, non-empty task title within the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for blank input or
    /// [`TaskDomainError::TitleTooLong`] when the trimmed title exceeds
    /// `limits.max_title_chars`.
    pub fn new(value: impl Into<String>, limits: TextLimits) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > limits.max_title_chars {
            return Err(TaskDomainError::TitleTooLong {
                max: limits.max_title_chars,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Rebuilds a title loaded from storage without re-applying limits.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed task description within the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated description. Blank input yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DescriptionTooLong`] when the trimmed text
    /// exceeds `limits.max_description_chars`.
    pub fn new(
        value: impl Into<String>,
        limits: TextLimits,
    ) -> Result<Option<Self>, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let actual = trimmed.chars().count();
        if actual > limits.max_description_chars {
            return Err(TaskDomainError::DescriptionTooLong {
                max: limits.max_description_chars,
                actual,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Rebuilds a description loaded from storage without re-applying limits.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
