//! Domain model for users and roles.

mod error;
mod ids;
mod user;

pub use error::{ParseRoleError, UserDomainError};
pub use ids::{ExternalId, UserId};
pub use user::{DisplayName, PersistedUserData, Role, User};
