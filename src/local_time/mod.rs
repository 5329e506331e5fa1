//! Display-offset time handling.
//!
//! Every timestamp the crate persists is an absolute UTC instant. Users see
//! those instants shifted by a single configured whole-hour offset, and type
//! deadlines relative to that same offset. This module owns both directions
//! of the conversion plus the free-form deadline parser used by the
//! conversation layer.

mod deadline;
mod offset;

pub use deadline::{DeadlineParser, ParseFailure};
pub use offset::{DisplayOffset, DisplayStyle, InvalidOffset, UNSPECIFIED};
