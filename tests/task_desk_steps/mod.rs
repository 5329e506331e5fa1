//! Step definitions for task desk behaviour scenarios.

pub mod when;
