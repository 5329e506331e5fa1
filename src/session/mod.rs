//! Per-conversation form state.
//!
//! Multi-step chat flows keep their progress in an explicit
//! [`domain::TaskDraftForm`] stored per [`domain::SessionId`], advanced by
//! the pure [`domain::advance`] function. The lifecycle engine never sees
//! this state; [`services::TaskDraftFlow`] submits a finished draft as an
//! ordinary create request.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
