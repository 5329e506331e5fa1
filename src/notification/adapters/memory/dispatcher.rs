//! Recording dispatcher for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::notification::ports::{DispatchError, NotificationDispatcher};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;

/// One message accepted by [`InMemoryDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    /// Recipient.
    pub recipient_id: UserId,
    /// Message body.
    pub message: String,
    /// Related task.
    pub task_id: Option<TaskId>,
}

#[derive(Debug, Default)]
struct DispatcherState {
    delivered: Vec<DeliveredMessage>,
    unreachable: HashSet<UserId>,
}

/// Dispatcher that records deliveries in memory.
///
/// Recipients marked unreachable fail with [`DispatchError::Network`] until
/// restored.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDispatcher {
    state: Arc<RwLock<DispatcherState>>,
}

impl InMemoryDispatcher {
    /// Creates a dispatcher that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes deliveries to `recipient_id` fail.
    pub fn set_unreachable(&self, recipient_id: UserId) {
        if let Ok(mut state) = self.state.write() {
            state.unreachable.insert(recipient_id);
        }
    }

    /// Makes deliveries to `recipient_id` succeed again.
    pub fn restore(&self, recipient_id: UserId) {
        if let Ok(mut state) = self.state.write() {
            state.unreachable.remove(&recipient_id);
        }
    }

    /// Returns every accepted message in delivery order.
    #[must_use]
    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.state
            .read()
            .map(|state| state.delivered.clone())
            .unwrap_or_default()
    }

    /// Returns messages accepted for one recipient.
    #[must_use]
    pub fn delivered_to(&self, recipient_id: UserId) -> Vec<DeliveredMessage> {
        self.delivered()
            .into_iter()
            .filter(|message| message.recipient_id == recipient_id)
            .collect()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryDispatcher {
    async fn send(
        &self,
        recipient_id: UserId,
        message: &str,
        task_id: Option<TaskId>,
    ) -> Result<(), DispatchError> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DispatchError::Network(err.to_string()))?;
        if state.unreachable.contains(&recipient_id) {
            return Err(DispatchError::Network(format!(
                "recipient {recipient_id} unreachable"
            )));
        }
        state.delivered.push(DeliveredMessage {
            recipient_id,
            message: message.to_owned(),
            task_id,
        });
        Ok(())
    }
}
