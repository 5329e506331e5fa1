//! Notification services: rendering, delivery, event handling, scheduling.

mod delivery;
mod handler;
mod render;
mod scheduler;

pub use delivery::{DeliveryError, NotificationDelivery};
pub use handler::NotificationEventHandler;
pub use render::{Locale, MessageRenderer, RenderError};
pub use scheduler::{NotificationScheduler, SchedulerError, SchedulerSettings, TickReport};
