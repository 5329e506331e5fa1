//! Shared fixtures for integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use taskdesk::user::{
    domain::{DisplayName, ExternalId, Role, User, UserId},
    ports::UserRepository,
};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 2026-03-10 10:00:00 UTC.
pub fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Registers a user and returns its id.
///
/// # Errors
///
/// Returns an error when the name is blank or the external id is taken.
pub async fn register(
    users: &impl UserRepository,
    clock: &ManualClock,
    external_id: i64,
    name: &str,
    role: Role,
) -> eyre::Result<UserId> {
    let user = User::register(ExternalId::new(external_id), DisplayName::new(name)?, role, clock);
    users.store(&user).await?;
    Ok(user.id())
}
