//! Layered configuration loading with `figment`.
//!
//! Merge order, later wins: compiled defaults, an optional TOML file, then
//! `TASKDESK_*` environment variables.

use super::{AppConfig, ConfigError};
use camino::Utf8Path;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TASKDESK_";

const SECTIONS: [&str; 7] = [
    "scheduler", "display", "limits", "auth", "storage", "logging", "reports",
];

/// Builds the figment without extracting it.
#[must_use]
pub fn build_figment(path: Option<&Utf8Path>) -> Figment {
    let base = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    let with_file = match path {
        Some(file) => base.merge(Toml::file(file)),
        None => base,
    };
    with_file.merge(env_provider())
}

/// Loads and validates configuration from `path` plus the environment.
///
/// # Errors
///
/// Returns [`ConfigError::Load`] when a source cannot be parsed and
/// [`ConfigError::Invalid`] when the merged values break a rule.
pub fn load(path: Option<&Utf8Path>) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = build_figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates configuration from TOML text only.
///
/// # Errors
///
/// As for [`load`].
pub fn load_from_str(toml: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::string(toml))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Maps `TASKDESK_SECTION_KEY` to `section.key`.
///
/// Only the leading section name is split off, so keys that contain
/// underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        let raw = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                raw.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(raw)
            .into()
    })
}
