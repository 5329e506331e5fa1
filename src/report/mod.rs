//! Statistics and report exports.
//!
//! Aggregation lives in [`domain`] as pure functions over task lists so the
//! same definitions back chat summaries and exported files. [`services`]
//! loads data through the task and user ports; [`adapters`] hold renderers.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
