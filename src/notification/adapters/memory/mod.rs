//! In-memory notification adapters for tests and local wiring.

mod dispatcher;
mod notification;

pub use dispatcher::{DeliveredMessage, InMemoryDispatcher};
pub use notification::InMemoryNotificationRepository;
