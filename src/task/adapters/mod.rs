//! Adapter implementations for task ports.

pub mod events;
pub mod memory;
pub mod postgres;
