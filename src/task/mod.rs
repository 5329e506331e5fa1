//! Task lifecycle management.
//!
//! Tasks are created by admins, assigned to workers, and moved through a
//! status machine in which every status or assignee change is written to an
//! append-only history together with the change itself. The module follows
//! hexagonal architecture:
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
