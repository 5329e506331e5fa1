//! Conversational task creation over the in-memory desk.

use std::sync::Arc;

use super::helpers::{Desk, build_desk};
use chrono::{TimeZone, Utc};
use eyre::{OptionExt, bail, ensure};
use rstest::rstest;
use taskdesk::local_time::{DisplayOffset, DisplayStyle};
use taskdesk::notification::domain::NotificationKind;
use taskdesk::session::{
    adapters::memory::InMemorySessionStore,
    domain::{FormError, SessionId},
    services::{DraftReply, TaskDraftFlow},
};
use taskdesk::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskPriority},
};
use taskdesk::user::adapters::memory::InMemoryUserRepository;

use crate::test_helpers::ManualClock;

type DeskFlow =
    TaskDraftFlow<InMemorySessionStore, InMemoryTaskRepository, InMemoryUserRepository, ManualClock>;

const SESSION: SessionId = SessionId::new(7);

fn flow(desk: &Desk) -> DeskFlow {
    TaskDraftFlow::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::clone(&desk.lifecycle),
        Arc::clone(&desk.users),
        Arc::clone(&desk.clock),
    )
}

async fn answer_all(flow: &DeskFlow, desk: &Desk, answers: &[&str]) -> eyre::Result<Task> {
    flow.start(SESSION).await?;
    let mut created = None;
    for answer in answers {
        if let DraftReply::Created(task) = flow.submit(SESSION, desk.admin, answer).await? {
            created = Some(task);
        }
    }
    created.ok_or_eyre("draft did not produce a task")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn local_deadline_is_stored_in_utc_and_shown_back_unchanged() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let drafts = flow(&desk);

    let task = answer_all(
        &drafts,
        &desk,
        &["Inventory check", "-", "high", "11.03.2026 18:00", "carol"],
    )
    .await?;

    let expected = Utc
        .with_ymd_and_hms(2026, 3, 11, 13, 0, 0)
        .single()
        .ok_or_eyre("invalid instant")?;
    ensure!(task.deadline() == Some(expected), "18:00 at +5 is 13:00 UTC");
    ensure!(task.priority() == TaskPriority::High, "priority collected");
    ensure!(task.assignee_id() == Some(desk.other_worker), "picked by name");
    ensure!(
        DisplayOffset::default().format(task.deadline(), DisplayStyle::DateTime)
            == "11.03.2026 18:00",
        "display round-trips the typed value"
    );
    ensure!(
        desk.notifications_of(task.id(), NotificationKind::Assignment)
            .await?
            .len()
            == 1,
        "chosen assignee is told"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unparseable_deadline_repeats_the_question() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let drafts = flow(&desk);
    drafts.start(SESSION).await?;
    for answer in ["Water plants", "-", "low"] {
        drafts.submit(SESSION, desk.admin, answer).await?;
    }

    let reply = drafts.submit(SESSION, desk.admin, "whenever").await?;

    let DraftReply::Retry { error, prompt } = reply else {
        bail!("expected a retry, got {reply:?}");
    };
    ensure!(matches!(error, FormError::Deadline(_)), "deadline error reported");
    ensure!(prompt.contains("deadline"), "same question asked again");
    Ok(())
}
