//! In-memory adapters for user persistence.

mod user;

pub use user::InMemoryUserRepository;
