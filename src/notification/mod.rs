//! Notification outbox and scheduler.
//!
//! Notifications are produced two ways: the scheduler's periodic sweep
//! (overdue alerts and deadline reminders) and task events (assignment and
//! completion notices). Both paths persist the notification first and then
//! deliver it through the [`ports::NotificationDispatcher`] port, so a
//! failed delivery is retried by the next drain.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
