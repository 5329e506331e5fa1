//! Outbound port for task domain events.

use crate::task::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Receiver of committed task events.
///
/// Publishing happens after the mutation is persisted. A failing sink is
/// logged by the caller and never undoes the mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskEventSink: Send + Sync {
    /// Publishes one event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEventSinkError`] when the event could not be handled.
    async fn publish(&self, event: &TaskEvent) -> Result<(), TaskEventSinkError>;
}

/// Errors returned by event sinks.
#[derive(Debug, Clone, Error)]
pub enum TaskEventSinkError {
    /// Nobody is listening.
    #[error("no subscribers for task events")]
    NoSubscribers,

    /// The handler failed.
    #[error("event handler failed: {0}")]
    Handler(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskEventSinkError {
    /// Wraps a handler error.
    pub fn handler(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Handler(Arc::new(err))
    }
}
