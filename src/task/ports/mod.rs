//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod events;
pub mod query;
pub mod repository;

#[cfg(test)]
pub use events::MockTaskEventSink;
pub use events::{TaskEventSink, TaskEventSinkError};
pub use query::{TaskQuery, listing_order};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
