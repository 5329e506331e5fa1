//! Event sink adapters: in-process broadcast and fan-out.

use crate::task::{
    domain::TaskEvent,
    ports::{TaskEventSink, TaskEventSinkError},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcasts events to in-process subscribers such as chat front ends.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<TaskEvent>,
}

impl BroadcastEventSink {
    /// Creates a sink buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a new subscription.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl TaskEventSink for BroadcastEventSink {
    async fn publish(&self, event: &TaskEvent) -> Result<(), TaskEventSinkError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| TaskEventSinkError::NoSubscribers)
    }
}

/// Forwards each event to every registered sink.
///
/// All sinks are attempted; the first failure is reported after the rest
/// have run. An empty composite accepts everything.
#[derive(Clone, Default)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn TaskEventSink>>,
}

impl CompositeEventSink {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TaskEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the number of registered sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns `true` when no sink is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl TaskEventSink for CompositeEventSink {
    async fn publish(&self, event: &TaskEvent) -> Result<(), TaskEventSinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.publish(event).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
