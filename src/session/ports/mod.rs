//! Port contracts for session state.

mod store;

#[cfg(test)]
pub use store::MockSessionStore;
pub use store::{SessionStore, SessionStoreError, SessionStoreResult};
