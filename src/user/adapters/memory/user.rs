//! In-memory repository for users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::user::{
    domain::{ExternalId, PersistedUserData, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    external_index: HashMap<ExternalId, UserId>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.external_index.contains_key(&user.external_id()) {
            return Err(UserRepositoryError::DuplicateExternalId(user.external_id()));
        }
        state.external_index.insert(user.external_id(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .external_index
            .get(&external_id)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn touch(&self, id: UserId, at: DateTime<Utc>) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let user = state
            .users
            .get(&id)
            .ok_or(UserRepositoryError::NotFound(id))?;
        let touched = User::from_persisted(PersistedUserData {
            id: user.id(),
            external_id: user.external_id(),
            display_name: user.display_name().clone(),
            role: user.role(),
            active: user.is_active(),
            registered_at: user.registered_at(),
            last_activity: at,
        });
        state.users.insert(id, touched);
        Ok(())
    }

    async fn list_active(&self, role: Option<Role>) -> UserRepositoryResult<Vec<User>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| user.is_active())
            .filter(|user| role.is_none_or(|wanted| user.role() == wanted))
            .cloned()
            .collect();
        users.sort_by_key(User::registered_at);
        Ok(users)
    }
}
