//! Storage port for in-progress forms.

use crate::session::domain::{SessionId, TaskDraftForm};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session store operations.
pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Holds at most one draft per session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the draft for `session`, if one is open.
    async fn load(&self, session: SessionId) -> SessionStoreResult<Option<TaskDraftForm>>;

    /// Replaces the draft for `session`.
    async fn save(&self, session: SessionId, form: &TaskDraftForm) -> SessionStoreResult<()>;

    /// Drops the draft for `session`. Missing drafts are ignored.
    async fn clear(&self, session: SessionId) -> SessionStoreResult<()>;
}

/// Errors returned by session store implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
