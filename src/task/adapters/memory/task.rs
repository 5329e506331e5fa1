//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskHistoryEntry, TaskId, TaskStatus},
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult, listing_order},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory task repository.
///
/// A single write lock covers the task map and the history log, so each
/// mutation and its entries become visible together.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    history: HashMap<TaskId, Vec<TaskHistoryEntry>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn save(&self, task: &Task, entries: &[TaskHistoryEntry]) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?
            .revision();
        if stored.checked_add(1) != Some(task.revision()) {
            return Err(TaskRepositoryError::Conflict {
                task_id: task.id(),
                stored,
                submitted: task.revision(),
            });
        }
        state.tasks.insert(task.id(), task.clone());
        state
            .history
            .entry(task.id())
            .or_default()
            .extend_from_slice(entries);
        Ok(())
    }

    fn collect<F>(&self, predicate: F) -> TaskRepositoryResult<Vec<Task>>
    where
        F: Fn(&Task) -> bool,
    {
        let state = self.state.read().map_err(lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| predicate(task))
            .cloned()
            .collect();
        tasks.sort_by(listing_order);
        Ok(tasks)
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        state.history.insert(task.id(), vec![entry.clone()]);
        Ok(())
    }

    async fn update_status(
        &self,
        task: &Task,
        entry: &TaskHistoryEntry,
    ) -> TaskRepositoryResult<()> {
        self.save(task, std::slice::from_ref(entry))
    }

    async fn reassign(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        self.save(task, std::slice::from_ref(entry))
    }

    async fn update_fields(
        &self,
        task: &Task,
        entries: &[TaskHistoryEntry],
    ) -> TaskRepositoryResult<()> {
        self.save(task, entries)
    }

    async fn append_history(&self, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.tasks.contains_key(&entry.task_id()) {
            return Err(TaskRepositoryError::NotFound(entry.task_id()));
        }
        state
            .history
            .entry(entry.task_id())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_assignee(
        &self,
        assignee_id: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.collect(|task| {
            task.is_assigned_to(assignee_id) && status.is_none_or(|wanted| task.status() == wanted)
        })
    }

    async fn list_all(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<Vec<Task>> {
        self.collect(|task| status.is_none_or(|wanted| task.status() == wanted))
    }

    async fn search(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let matching = self.collect(|task| query.matches(task))?;
        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.history.get(&id).cloned().unwrap_or_default())
    }

    async fn list_past_deadline(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        self.collect(|task| !task.status().is_terminal() && task.is_past_deadline(now))
    }

    async fn list_reminder_candidates(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.collect(|task| {
            task.status().is_active() && task.deadline().is_some() && task.assignee_id().is_some()
        })
    }
}
