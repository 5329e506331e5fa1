//! In-memory session store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::session::{
    domain::{SessionId, TaskDraftForm},
    ports::{SessionStore, SessionStoreError, SessionStoreResult},
};

/// Thread-safe in-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    forms: Arc<RwLock<HashMap<SessionId, TaskDraftForm>>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> SessionStoreError {
    SessionStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session: SessionId) -> SessionStoreResult<Option<TaskDraftForm>> {
        let forms = self.forms.read().map_err(lock_error)?;
        Ok(forms.get(&session).cloned())
    }

    async fn save(&self, session: SessionId, form: &TaskDraftForm) -> SessionStoreResult<()> {
        let mut forms = self.forms.write().map_err(lock_error)?;
        forms.insert(session, form.clone());
        Ok(())
    }

    async fn clear(&self, session: SessionId) -> SessionStoreResult<()> {
        let mut forms = self.forms.write().map_err(lock_error)?;
        forms.remove(&session);
        Ok(())
    }
}
