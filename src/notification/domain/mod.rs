//! Notification domain model.
//!
//! A notification is a message addressed to one user about one task. It is
//! persisted before delivery and moves from unsent to sent exactly once.

mod error;
mod ids;
mod kind;
mod notification;

pub use error::{NotificationDomainError, ParseNotificationKindError};
pub use ids::NotificationId;
pub use kind::NotificationKind;
pub use notification::{DedupKey, DedupScope, NewNotification, Notification, PersistedNotificationData};
