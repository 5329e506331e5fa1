//! Application services for user sign-in.

mod access;
mod authenticator;

pub use access::{AccessError, AccessService, SignInRequest};
pub use authenticator::SharedSecretAuthenticator;
