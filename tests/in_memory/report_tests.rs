//! Reports assembled from tasks created through the lifecycle service.

use std::sync::Arc;

use super::helpers::{Desk, build_desk};
use camino::Utf8PathBuf;
use eyre::{OptionExt, ensure};
use rstest::rstest;
use taskdesk::report::{
    adapters::JsonReportExporter,
    domain::UNASSIGNED,
    services::{ReportFilter, ReportService},
};
use taskdesk::task::{
    adapters::memory::InMemoryTaskRepository, domain::TaskStatus, services::CreateTaskRequest,
};
use taskdesk::user::adapters::memory::InMemoryUserRepository;

use crate::test_helpers::ManualClock;

type DeskReports = ReportService<InMemoryTaskRepository, InMemoryUserRepository, ManualClock>;

fn reports(desk: &Desk) -> DeskReports {
    ReportService::new(
        Arc::clone(&desk.tasks),
        Arc::clone(&desk.users),
        Arc::clone(&desk.clock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_desk_reports_zero_completion() -> eyre::Result<()> {
    let desk = build_desk().await?;

    let data = reports(&desk).assemble(ReportFilter::default()).await?;

    ensure!(data.summary.counts.total == 0, "no tasks yet");
    ensure!(
        format!("{:.1}", data.completion_rate) == "0.0",
        "rate is zero, not NaN"
    );
    ensure!(data.summary.total_users == 3, "three active users");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn statistics_follow_lifecycle_changes() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let done = desk.assigned_task("Write minutes", desk.worker, 24).await?;
    desk.assigned_task("Fix printer", desk.worker, 24).await?;
    desk.lifecycle
        .create_task(CreateTaskRequest::new("Clean backlog"), desk.admin)
        .await?;
    desk.lifecycle
        .change_status(done.id(), TaskStatus::Completed, desk.worker)
        .await?;
    let service = reports(&desk);

    let mine = service.user_stats(desk.worker).await?;
    ensure!(mine.total == 2, "worker has two tasks");
    ensure!(mine.completed == 1, "one of them finished");
    ensure!(format!("{:.1}", mine.completion_rate()) == "50.0", "half done");

    let general = service.general_stats().await?;
    ensure!(general.counts.total == 3, "three tasks overall");
    ensure!(general.distinct_assignees == 1, "only one worker holds tasks");

    let data = service.assemble(ReportFilter::default()).await?;
    let unassigned = data
        .assignees
        .iter()
        .find(|row| row.assignee_id.is_none())
        .ok_or_eyre("unassigned row missing")?;
    ensure!(unassigned.name == UNASSIGNED, "unassigned tasks are grouped");
    let bob = data
        .assignees
        .iter()
        .find(|row| row.assignee_id == Some(desk.worker))
        .ok_or_eyre("worker row missing")?;
    ensure!(bob.name == "Bob", "rows are labelled with display names");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filtered_export_writes_only_matching_tasks() -> eyre::Result<()> {
    let desk = build_desk().await?;
    let done = desk.assigned_task("Send newsletter", desk.worker, 24).await?;
    desk.assigned_task("Order lunch", desk.worker, 24).await?;
    desk.lifecycle
        .change_status(done.id(), TaskStatus::Completed, desk.worker)
        .await?;
    let temp = tempfile::tempdir()?;
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|path| eyre::eyre!("non-UTF-8 temp path {}", path.display()))?;
    let exporter = JsonReportExporter::new(root);

    let path = reports(&desk)
        .export(&exporter, ReportFilter::default().with_status(TaskStatus::Completed))
        .await?;

    let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    let rows = written
        .pointer("/tasks")
        .and_then(serde_json::Value::as_array)
        .ok_or_eyre("tasks missing from export")?;
    ensure!(rows.len() == 1, "only the completed task is exported");
    ensure!(
        written.pointer("/tasks/0/title") == Some(&serde_json::json!("Send newsletter")),
        "completed task exported"
    );
    Ok(())
}
