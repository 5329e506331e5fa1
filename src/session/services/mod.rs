//! Application services driving conversation forms.

mod drafts;

pub use drafts::{DraftError, DraftReply, TaskDraftFlow};
