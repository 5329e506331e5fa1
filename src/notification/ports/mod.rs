//! Ports for notification persistence and delivery.

pub mod dispatch;
pub mod repository;

#[cfg(test)]
pub use dispatch::MockNotificationDispatcher;
pub use dispatch::{DispatchError, NotificationDispatcher};
pub use repository::{
    NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult,
};
