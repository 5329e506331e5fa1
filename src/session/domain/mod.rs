//! Conversation form state.

mod error;
mod form;
mod ids;

pub use error::FormError;
pub use form::{AssigneeChoice, FormContext, FormStep, SKIP, TaskDraftForm, Transition, advance};
pub use ids::SessionId;
