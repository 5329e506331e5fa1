//! Users, roles, and shared-secret sign-in.
//!
//! A user record is created the first time someone presents a valid shared
//! secret. The secret decides the role once; later sign-ins only refresh the
//! activity timestamp.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
