//! Error types for the notification domain.

use super::NotificationId;
use thiserror::Error;

/// Errors returned by notification state changes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// The notification was already delivered.
    #[error("notification {0} was already sent")]
    AlreadySent(NotificationId),
}

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);
