//! Dispatcher that writes messages to the log.
//!
//! Used by the scheduler binary when no chat transport is wired in.

use async_trait::async_trait;
use tracing::info;

use crate::notification::ports::{DispatchError, NotificationDispatcher};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;

/// Dispatcher that logs each message at `info` and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn send(
        &self,
        recipient_id: UserId,
        message: &str,
        task_id: Option<TaskId>,
    ) -> Result<(), DispatchError> {
        let task = task_id.map(|id| id.to_string()).unwrap_or_default();
        info!(recipient_id = %recipient_id, task_id = %task, message, "notification dispatched");
        Ok(())
    }
}
