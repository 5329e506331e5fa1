//! Application configuration.
//!
//! [`AppConfig`] is loaded by [`load`] from compiled defaults, an optional
//! TOML file and `TASKDESK_*` environment variables, then checked by
//! [`AppConfig::validate`]. Accessors convert the plain values into the
//! settings types the services take.

mod loader;
mod model;
mod validation;

pub use loader::{ENV_PREFIX, build_figment, load, load_from_str};
pub use model::{
    AppConfig, AuthConfig, DisplayConfig, LimitsConfig, LoggingConfig, ReportsConfig,
    SchedulerConfig, StorageConfig,
};

use crate::local_time::{DeadlineParser, DisplayOffset, InvalidOffset};
use crate::notification::services::MessageRenderer;
use crate::task::services::LifecycleSettings;
use crate::user::services::SharedSecretAuthenticator;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    /// The merged configuration breaks one or more rules.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// The display offset is outside the supported range.
    #[error(transparent)]
    Offset(#[from] InvalidOffset),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

impl AppConfig {
    /// Returns the validated display offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Offset`] for offsets outside −12..=14.
    pub fn display_offset(&self) -> Result<DisplayOffset, ConfigError> {
        Ok(self.display.offset()?)
    }

    /// Builds lifecycle validation settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Offset`] for an unsupported display offset.
    pub fn lifecycle_settings(&self) -> Result<LifecycleSettings, ConfigError> {
        Ok(LifecycleSettings {
            limits: self.limits.text(),
            deadline_parser: DeadlineParser::new(self.display_offset()?),
        })
    }

    /// Builds the notification message renderer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Offset`] for an unsupported display offset.
    pub fn message_renderer(&self) -> Result<MessageRenderer, ConfigError> {
        Ok(MessageRenderer::new(self.display_offset()?).with_locale(self.display.locale))
    }

    /// Builds the shared-secret authenticator.
    #[must_use]
    pub fn authenticator(&self) -> SharedSecretAuthenticator {
        SharedSecretAuthenticator::new(&self.auth.admin_secret, &self.auth.worker_secret)
    }
}
