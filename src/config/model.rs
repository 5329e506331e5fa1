//! Configuration sections and their compiled defaults.

use crate::local_time::{DisplayOffset, InvalidOffset};
use crate::notification::services::{Locale, SchedulerSettings};
use crate::task::domain::TextLimits;
use crate::task::ports::TaskQuery;
use camino::Utf8PathBuf;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration.
///
/// Every section falls back to its defaults, so an empty file is valid
/// input to the loader (validation still demands the auth secrets).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Deadline sweep and reminder timing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// How timestamps are shown.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Text and paging limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Shared secrets for sign-in.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Database connection.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Report exports.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Scheduler timing, in whole seconds and hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between ticks.
    pub tick_interval_secs: u64,
    /// Seconds to wait after a failed tick.
    pub recovery_interval_secs: u64,
    /// Reminder lead times in hours.
    pub lead_hours: Vec<u32>,
    /// Seconds ahead of now in which reminders are planned.
    pub reminder_window_secs: u32,
    /// Seconds allowed for one delivery attempt.
    pub dispatch_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 300,
            recovery_interval_secs: 60,
            lead_hours: vec![24, 6, 1],
            reminder_window_secs: 3600,
            dispatch_timeout_secs: 30,
        }
    }
}

impl SchedulerConfig {
    /// Converts to the scheduler's runtime settings.
    #[must_use]
    pub fn settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            tick_interval: Duration::from_secs(self.tick_interval_secs),
            recovery_interval: Duration::from_secs(self.recovery_interval_secs),
            lead_hours: self.lead_hours.clone(),
            reminder_window: TimeDelta::seconds(i64::from(self.reminder_window_secs)),
            dispatch_timeout: Duration::from_secs(self.dispatch_timeout_secs),
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Whole-hour offset from UTC used for display and deadline input.
    pub offset_hours: i32,
    /// Language of notification messages, `en` or `ru`.
    pub locale: Locale,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            offset_hours: DisplayOffset::default().hours(),
            locale: Locale::default(),
        }
    }
}

impl DisplayConfig {
    /// Returns the validated display offset.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOffset`] outside −12..=14 hours.
    pub fn offset(self) -> Result<DisplayOffset, InvalidOffset> {
        DisplayOffset::from_hours(self.offset_hours)
    }
}

/// Text and paging limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum title length in characters.
    pub max_title_chars: usize,
    /// Maximum description length in characters.
    pub max_description_chars: usize,
    /// Tasks per listing page.
    pub page_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let text = TextLimits::default();
        Self {
            max_title_chars: text.max_title_chars,
            max_description_chars: text.max_description_chars,
            page_size: 5,
        }
    }
}

impl LimitsConfig {
    /// Returns the text limits.
    #[must_use]
    pub const fn text(self) -> TextLimits {
        TextLimits {
            max_title_chars: self.max_title_chars,
            max_description_chars: self.max_description_chars,
        }
    }

    /// Returns an unfiltered query for the zero-based listing `page`.
    #[must_use]
    pub const fn page(self, page: usize) -> TaskQuery {
        let mut query = TaskQuery::new();
        query.limit = self.page_size;
        query.offset = page.saturating_mul(self.page_size);
        query
    }
}

/// Shared sign-in secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Secret granting the admin role.
    pub admin_secret: String,
    /// Secret granting the worker role.
    pub worker_secret: String,
}

/// Database settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/taskdesk".to_owned(),
            pool_size: 8,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for this crate's targets when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Report export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsConfig {
    /// Directory exported reports are written to.
    pub output_dir: Utf8PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("reports"),
        }
    }
}
