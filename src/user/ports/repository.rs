//! Repository port for user persistence and lookup.

use crate::user::domain::{ExternalId, Role, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateExternalId`] when the transport
    /// identifier is already registered.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by internal identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by transport identifier.
    async fn find_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> UserRepositoryResult<Option<User>>;

    /// Records the latest interaction time.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist.
    async fn touch(&self, id: UserId, at: DateTime<Utc>) -> UserRepositoryResult<()>;

    /// Lists active users, optionally restricted to one role.
    async fn list_active(&self, role: Option<Role>) -> UserRepositoryResult<Vec<User>>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// The transport identifier is already registered.
    #[error("external id already registered: {0}")]
    DuplicateExternalId(ExternalId),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
