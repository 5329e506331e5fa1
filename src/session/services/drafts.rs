//! Task creation through a multi-step conversation.

use crate::session::domain::{
    AssigneeChoice, FormContext, FormError, SessionId, TaskDraftForm, Transition, advance,
};
use crate::session::ports::{SessionStore, SessionStoreError};
use crate::task::domain::Task;
use crate::task::ports::TaskRepository;
use crate::task::services::{CreateTaskRequest, TaskLifecycleError, TaskLifecycleService};
use crate::user::domain::{Role, UserId};
use crate::user::ports::{UserRepository, UserRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// What to show the user after one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftReply {
    /// Ask the next question.
    Prompt(String),
    /// The input was rejected; ask the same question again.
    Retry {
        /// Why the input was rejected.
        error: FormError,
        /// The repeated question.
        prompt: String,
    },
    /// The draft was submitted and the task created.
    Created(Task),
    /// The draft was abandoned.
    Cancelled,
}

/// Errors raised while driving a draft.
#[derive(Debug, Error)]
pub enum DraftError {
    /// No draft is open for the session.
    #[error("no draft open for session {0}")]
    NoOpenDraft(SessionId),

    /// Session storage failed.
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),

    /// Loading assignee candidates failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),

    /// Creating the task failed; the draft has been discarded.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),
}

/// Drives [`TaskDraftForm`]s stored per session and submits completed
/// drafts to the lifecycle service.
#[derive(Clone)]
pub struct TaskDraftFlow<S, R, U, C>
where
    S: SessionStore,
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    sessions: Arc<S>,
    lifecycle: Arc<TaskLifecycleService<R, U, C>>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<S, R, U, C> TaskDraftFlow<S, R, U, C>
where
    S: SessionStore,
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new draft flow.
    #[must_use]
    pub const fn new(
        sessions: Arc<S>,
        lifecycle: Arc<TaskLifecycleService<R, U, C>>,
        users: Arc<U>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            sessions,
            lifecycle,
            users,
            clock,
        }
    }

    /// Opens a fresh draft for `session`, replacing any open one.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Sessions`] when the draft cannot be stored.
    pub async fn start(&self, session: SessionId) -> Result<String, DraftError> {
        let form = TaskDraftForm::new();
        self.sessions.save(session, &form).await?;
        Ok(form.prompt(&self.context(&[])))
    }

    /// Feeds one input from `actor_id` to the draft open in `session`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NoOpenDraft`] without an open draft, storage
    /// errors, or [`DraftError::Lifecycle`] when submission fails.
    pub async fn submit(
        &self,
        session: SessionId,
        actor_id: UserId,
        input: &str,
    ) -> Result<DraftReply, DraftError> {
        let form = self
            .sessions
            .load(session)
            .await?
            .ok_or(DraftError::NoOpenDraft(session))?;
        let choices = self.assignee_choices().await?;
        let context = self.context(&choices);

        match advance(form, input, &context) {
            Transition::Cancelled => {
                self.sessions.clear(session).await?;
                Ok(DraftReply::Cancelled)
            }
            Transition::Rejected { form: kept, error } => {
                debug!(session = %session, error = %error, "draft input rejected");
                Ok(DraftReply::Retry {
                    prompt: kept.prompt(&context),
                    error,
                })
            }
            Transition::Advanced(next) if next.is_ready() => {
                self.sessions.clear(session).await?;
                let task = self
                    .lifecycle
                    .create_task(request_from(&next), actor_id)
                    .await?;
                Ok(DraftReply::Created(task))
            }
            Transition::Advanced(next) => {
                self.sessions.save(session, &next).await?;
                Ok(DraftReply::Prompt(next.prompt(&context)))
            }
        }
    }

    async fn assignee_choices(&self) -> Result<Vec<AssigneeChoice>, DraftError> {
        let workers = self.users.list_active(Some(Role::Worker)).await?;
        Ok(workers
            .iter()
            .map(|user| AssigneeChoice {
                user_id: user.id(),
                name: user.display_name().to_string(),
            })
            .collect())
    }

    fn context<'a>(&self, assignees: &'a [AssigneeChoice]) -> FormContext<'a> {
        let settings = self.lifecycle.settings();
        FormContext {
            limits: settings.limits,
            parser: settings.deadline_parser,
            now: self.clock.utc(),
            assignees,
        }
    }
}

fn request_from(form: &TaskDraftForm) -> CreateTaskRequest {
    let title = form.title().map(ToString::to_string).unwrap_or_default();
    let mut request = CreateTaskRequest::new(title).with_priority(form.priority());
    if let Some(description) = form.description() {
        request = request.with_description(description.to_string());
    }
    if let Some(deadline) = form.deadline() {
        request = request.with_deadline(deadline);
    }
    if let Some(assignee_id) = form.assignee_id() {
        request = request.with_assignee(assignee_id);
    }
    request
}
