//! Sign-in and activity tracking.

use crate::user::{
    domain::{DisplayName, ExternalId, Role, User, UserDomainError},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::SharedSecretAuthenticator;

/// Sign-in attempt from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    /// Transport identifier of the person signing in.
    pub external_id: ExternalId,
    /// Name shown in task listings.
    pub display_name: String,
    /// Shared secret typed by the person.
    pub secret: String,
}

impl SignInRequest {
    /// Creates a sign-in request.
    #[must_use]
    pub fn new(
        external_id: ExternalId,
        display_name: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            external_id,
            display_name: display_name.into(),
            secret: secret.into(),
        }
    }
}

/// Service-level errors for sign-in.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// Result type for access service operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Registers users on first sign-in and tracks their activity.
#[derive(Clone)]
pub struct AccessService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    authenticator: SharedSecretAuthenticator,
    clock: Arc<C>,
}

impl<U, C> AccessService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new access service.
    #[must_use]
    pub const fn new(
        users: Arc<U>,
        authenticator: SharedSecretAuthenticator,
        clock: Arc<C>,
    ) -> Self {
        Self {
            users,
            authenticator,
            clock,
        }
    }

    /// Returns the user for an already registered transport identifier,
    /// refreshing its activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Repository`] when persistence fails.
    pub async fn touch(&self, external_id: ExternalId) -> AccessResult<Option<User>> {
        let Some(mut user) = self.users.find_by_external_id(external_id).await? else {
            return Ok(None);
        };
        user.touch(&*self.clock);
        self.users.touch(user.id(), user.last_activity()).await?;
        Ok(Some(user))
    }

    /// Signs a person in.
    ///
    /// Known users are returned regardless of the secret and keep their
    /// original role. Unknown users are registered with the role unlocked by
    /// the secret. Returns `Ok(None)` when an unknown user presents a wrong
    /// secret.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when the display name is blank or persistence
    /// fails.
    pub async fn sign_in(&self, request: SignInRequest) -> AccessResult<Option<User>> {
        if let Some(existing) = self.touch(request.external_id).await? {
            return Ok(Some(existing));
        }
        let Some(role) = self.authenticator.authenticate(&request.secret) else {
            return Ok(None);
        };
        let display_name = DisplayName::new(request.display_name)?;
        let user = User::register(request.external_id, display_name, role, &*self.clock);
        self.users.store(&user).await?;
        info!(user_id = %user.id(), role = %role, "registered user");
        Ok(Some(user))
    }

    /// Lists active workers, for assignment menus.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Repository`] when persistence fails.
    pub async fn list_workers(&self) -> AccessResult<Vec<User>> {
        Ok(self.users.list_active(Some(Role::Worker)).await?)
    }
}
