//! Outbound port for the chat transport's send primitive.

use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Sends rendered messages to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers `message` to `recipient_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the transport did not accept the
    /// message. Every failure is retried on the next scheduler tick.
    async fn send(
        &self,
        recipient_id: UserId,
        message: &str,
        task_id: Option<TaskId>,
    ) -> Result<(), DispatchError>;
}

/// Delivery failures reported by dispatchers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The transport could not be reached.
    #[error("transport unreachable: {0}")]
    Network(String),

    /// The transport asked the caller to slow down.
    #[error("rate limited by transport")]
    RateLimited {
        /// Suggested wait before retrying.
        retry_after: Option<Duration>,
    },

    /// The attempt exceeded the configured bound.
    #[error("delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// The recipient cannot be reached through the transport.
    #[error("recipient {0} is unknown to the transport")]
    UnknownRecipient(UserId),
}
