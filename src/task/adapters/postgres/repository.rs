//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{HistoryRow, NewHistoryRow, TaskRecord, TaskRow},
    schema::{task_history, tasks},
};
use crate::task::{
    domain::{
        Actor, HistoryAction, PersistedTaskData, Task, TaskDescription, TaskHistoryEntry, TaskId,
        TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedTaskQuery<'a> = tasks::BoxedQuery<'a, Pg>;

const TERMINAL_STATUSES: [&str; 2] = [
    TaskStatus::Completed.as_str(),
    TaskStatus::Cancelled.as_str(),
];

const ACTIVE_STATUSES: [&str; 2] = [TaskStatus::New.as_str(), TaskStatus::InProgress.as_str()];

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn save(&self, task: &Task, entries: &[TaskHistoryEntry]) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let submitted = task.revision();
        let record = to_record(task)?;
        let history: Vec<NewHistoryRow> = entries.iter().map(to_history_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let expected = record.revision.checked_sub(1).ok_or_else(|| {
                    TaskRepositoryError::Conflict {
                        task_id,
                        stored: 0,
                        submitted,
                    }
                })?;
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(record.id))
                        .filter(tasks::revision.eq(expected)),
                )
                .set(&record)
                .execute(tx)
                .map_err(TaskRepositoryError::persistence)?;

                if updated == 0 {
                    return Err(classify_missed_update(tx, task_id, submitted));
                }

                diesel::insert_into(task_history::table)
                    .values(&history)
                    .execute(tx)
                    .map_err(TaskRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }

    async fn load_many(
        &self,
        build: impl FnOnce() -> BoxedTaskQuery<'static> + Send + 'static,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = build()
                .order((tasks::deadline.asc().nulls_last(), tasks::created_at.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let record = to_record(task)?;
        let history = to_history_row(entry);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                diesel::insert_into(task_history::table)
                    .values(&history)
                    .execute(tx)
                    .map_err(TaskRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_status(
        &self,
        task: &Task,
        entry: &TaskHistoryEntry,
    ) -> TaskRepositoryResult<()> {
        self.save(task, std::slice::from_ref(entry)).await
    }

    async fn reassign(&self, task: &Task, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        self.save(task, std::slice::from_ref(entry)).await
    }

    async fn update_fields(
        &self,
        task: &Task,
        entries: &[TaskHistoryEntry],
    ) -> TaskRepositoryResult<()> {
        self.save(task, entries).await
    }

    async fn append_history(&self, entry: &TaskHistoryEntry) -> TaskRepositoryResult<()> {
        let task_id = entry.task_id();
        let history = to_history_row(entry);
        self.run_blocking(move |connection| {
            diesel::insert_into(task_history::table)
                .values(&history)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_assignee(
        &self,
        assignee_id: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.load_many(move || {
            let query = tasks::table
                .filter(tasks::assignee_id.eq(assignee_id.into_inner()))
                .into_boxed();
            filter_status(query, status)
        })
        .await
    }

    async fn list_all(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<Vec<Task>> {
        self.load_many(move || filter_status(tasks::table.into_boxed(), status))
            .await
    }

    async fn search(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let filter = query.clone();
        let limit = i64::try_from(filter.limit).map_err(TaskRepositoryError::persistence)?;
        let offset = i64::try_from(filter.offset).map_err(TaskRepositoryError::persistence)?;
        self.load_many(move || {
            let mut boxed = filter_status(tasks::table.into_boxed(), filter.status);
            if let Some(priority) = filter.priority {
                boxed = boxed.filter(tasks::priority.eq(priority.as_str()));
            }
            if let Some(assignee) = filter.assignee_id {
                boxed = boxed.filter(tasks::assignee_id.eq(assignee.into_inner()));
            }
            if let Some(creator) = filter.creator_id {
                boxed = boxed.filter(tasks::creator_id.eq(creator.into_inner()));
            }
            if let Some(text) = filter.text.as_deref() {
                let pattern = like_pattern(text);
                boxed = boxed.filter(
                    tasks::title
                        .ilike(pattern.clone())
                        .or(tasks::description.assume_not_null().ilike(pattern)),
                );
            }
            boxed.limit(limit).offset(offset)
        })
        .await
    }

    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>> {
        self.run_blocking(move |connection| {
            let rows = task_history::table
                .filter(task_history::task_id.eq(id.into_inner()))
                .order((task_history::created_at.asc(), task_history::id.asc()))
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }

    async fn list_past_deadline(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        self.load_many(move || {
            tasks::table
                .filter(tasks::deadline.lt(now))
                .filter(tasks::status.ne_all(TERMINAL_STATUSES))
                .into_boxed()
        })
        .await
    }

    async fn list_reminder_candidates(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.load_many(|| {
            tasks::table
                .filter(tasks::status.eq_any(ACTIVE_STATUSES))
                .filter(tasks::deadline.is_not_null())
                .filter(tasks::assignee_id.is_not_null())
                .into_boxed()
        })
        .await
    }
}

fn filter_status(
    query: BoxedTaskQuery<'static>,
    status: Option<TaskStatus>,
) -> BoxedTaskQuery<'static> {
    match status {
        Some(wanted) => query.filter(tasks::status.eq(wanted.as_str())),
        None => query,
    }
}

fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped.push('%');
    escaped
}

fn classify_missed_update(
    connection: &mut PgConnection,
    task_id: TaskId,
    submitted: u64,
) -> TaskRepositoryError {
    let stored = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .select(tasks::revision)
        .first::<i64>(connection)
        .optional();
    match stored {
        Ok(None) => TaskRepositoryError::NotFound(task_id),
        Ok(Some(revision)) => TaskRepositoryError::Conflict {
            task_id,
            stored: u64::try_from(revision).unwrap_or_default(),
            submitted,
        },
        Err(err) => TaskRepositoryError::persistence(err),
    }
}

fn to_record(task: &Task) -> TaskRepositoryResult<TaskRecord> {
    Ok(TaskRecord {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(|text| text.as_str().to_owned()),
        creator_id: task.creator_id().into_inner(),
        assignee_id: task.assignee_id().map(UserId::into_inner),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        deadline: task.deadline(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        completed_at: task.completed_at(),
        revision: i64::try_from(task.revision()).map_err(TaskRepositoryError::persistence)?,
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        creator_id,
        assignee_id,
        status: persisted_status,
        priority: persisted_priority,
        deadline,
        created_at,
        updated_at,
        completed_at,
        revision,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: TaskTitle::from_persisted(title),
        description: description.map(TaskDescription::from_persisted),
        creator_id: UserId::from_uuid(creator_id),
        assignee_id: assignee_id.map(UserId::from_uuid),
        status,
        priority,
        deadline,
        created_at,
        updated_at,
        completed_at,
        revision: u64::try_from(revision).map_err(TaskRepositoryError::persistence)?,
    }))
}

fn to_history_row(entry: &TaskHistoryEntry) -> NewHistoryRow {
    NewHistoryRow {
        task_id: entry.task_id().into_inner(),
        actor_id: entry.actor().user_id().map(UserId::into_inner),
        action: entry.action().as_str().to_owned(),
        old_value: entry.old_value().map(str::to_owned),
        new_value: entry.new_value().map(str::to_owned),
        created_at: entry.recorded_at(),
    }
}

fn row_to_history(row: HistoryRow) -> TaskRepositoryResult<TaskHistoryEntry> {
    let action =
        HistoryAction::try_from(row.action.as_str()).map_err(TaskRepositoryError::persistence)?;
    let actor = row
        .actor_id
        .map_or(Actor::System, |id| Actor::User(UserId::from_uuid(id)));
    Ok(
        TaskHistoryEntry::new(TaskId::from_uuid(row.task_id), actor, action, row.created_at)
            .with_old_value(row.old_value)
            .with_new_value(row.new_value),
    )
}
