//! Semantic checks serde cannot express.

use super::{AppConfig, ConfigError};

impl AppConfig {
    /// Checks every rule and reports all violations together.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing each broken rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems: Vec<String> = [
            self.scheduler_problems(),
            self.display_problems(),
            self.limit_problems(),
            self.auth_problems(),
            self.runtime_problems(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    fn scheduler_problems(&self) -> Vec<String> {
        let scheduler = &self.scheduler;
        let mut problems = Vec::new();
        if scheduler.tick_interval_secs == 0 {
            problems.push("scheduler.tick_interval_secs must be positive".to_owned());
        }
        if scheduler.lead_hours.is_empty() {
            problems.push("scheduler.lead_hours must not be empty".to_owned());
        }
        if scheduler.lead_hours.contains(&0) {
            problems.push("scheduler.lead_hours must not contain 0".to_owned());
        }
        if u64::from(scheduler.reminder_window_secs) < scheduler.tick_interval_secs {
            problems.push(format!(
                "scheduler.reminder_window_secs ({}) must cover the tick interval ({})",
                scheduler.reminder_window_secs, scheduler.tick_interval_secs
            ));
        }
        if scheduler.dispatch_timeout_secs == 0 {
            problems.push("scheduler.dispatch_timeout_secs must be positive".to_owned());
        }
        problems
    }

    fn display_problems(&self) -> Vec<String> {
        self.display
            .offset()
            .err()
            .map(|err| format!("display.offset_hours: {err}"))
            .into_iter()
            .collect()
    }

    fn limit_problems(&self) -> Vec<String> {
        [
            ("limits.max_title_chars", self.limits.max_title_chars),
            ("limits.max_description_chars", self.limits.max_description_chars),
            ("limits.page_size", self.limits.page_size),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| format!("{name} must be positive"))
        .collect()
    }

    fn auth_problems(&self) -> Vec<String> {
        let auth = &self.auth;
        let mut problems = Vec::new();
        if auth.admin_secret.trim().is_empty() {
            problems.push("auth.admin_secret must be set".to_owned());
        }
        if auth.worker_secret.trim().is_empty() {
            problems.push("auth.worker_secret must be set".to_owned());
        }
        if !auth.admin_secret.is_empty() && auth.admin_secret == auth.worker_secret {
            problems.push("auth.admin_secret and auth.worker_secret must differ".to_owned());
        }
        problems
    }

    fn runtime_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.storage.pool_size == 0 {
            problems.push("storage.pool_size must be positive".to_owned());
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            problems.push(format!(
                "logging.level '{}' is not a tracing level",
                self.logging.level
            ));
        }
        problems
    }
}
