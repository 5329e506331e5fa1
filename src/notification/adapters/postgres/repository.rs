//! `PostgreSQL` repository implementation for notifications.

use super::{models::NotificationRow, schema::notifications};
use crate::notification::{
    domain::{
        DedupKey, DedupScope, Notification, NotificationId, NotificationKind,
        PersistedNotificationData,
    },
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by notification adapters.
pub type NotificationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed notification repository.
#[derive(Debug, Clone)]
pub struct PostgresNotificationRepository {
    pool: NotificationPgPool,
}

impl PostgresNotificationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: NotificationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationRepositoryError::persistence)?
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn create(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let id = notification.id();
        let row = to_row(notification)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(notifications::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        NotificationRepositoryError::Duplicate(id)
                    }
                    _ => NotificationRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn exists(&self, key: DedupKey, scope: DedupScope) -> NotificationRepositoryResult<bool> {
        let lead_hours = key
            .lead_hours
            .map(i32::try_from)
            .transpose()
            .map_err(NotificationRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let mut query = notifications::table
                .filter(notifications::task_id.eq(key.task_id.into_inner()))
                .filter(notifications::kind.eq(key.kind.as_str()))
                .into_boxed();
            query = match lead_hours {
                Some(hours) => query.filter(notifications::lead_hours.eq(hours)),
                None => query.filter(notifications::lead_hours.is_null()),
            };
            if scope == DedupScope::Unsent {
                query = query.filter(notifications::sent_at.is_null());
            }
            let found = query
                .select(notifications::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?;
            Ok(found.is_some())
        })
        .await
    }

    async fn list_pending(
        &self,
        now: DateTime<Utc>,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::sent_at.is_null())
                .filter(notifications::scheduled_at.le(now))
                .order((
                    notifications::scheduled_at.asc(),
                    notifications::created_at.asc(),
                ))
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::task_id.eq(task_id.into_inner()))
                .order(notifications::created_at.asc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    async fn mark_sent(
        &self,
        id: NotificationId,
        sent_at: DateTime<Utc>,
    ) -> NotificationRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(id.into_inner()))
                    .filter(notifications::sent_at.is_null()),
            )
            .set(notifications::sent_at.eq(Some(sent_at)))
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)?;
            if updated > 0 {
                return Ok(());
            }

            let stored = notifications::table
                .filter(notifications::id.eq(id.into_inner()))
                .select(notifications::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?;
            Err(stored.map_or(NotificationRepositoryError::NotFound(id), |_| {
                NotificationRepositoryError::AlreadySent(id)
            }))
        })
        .await
    }

    async fn discard(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                notifications::table
                    .filter(notifications::id.eq(id.into_inner()))
                    .filter(notifications::sent_at.is_null()),
            )
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)?;
            if deleted > 0 {
                return Ok(());
            }
            let stored = notifications::table
                .filter(notifications::id.eq(id.into_inner()))
                .select(notifications::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?;
            Err(stored.map_or(NotificationRepositoryError::NotFound(id), |_| {
                NotificationRepositoryError::AlreadySent(id)
            }))
        })
        .await
    }
}

fn to_row(notification: &Notification) -> NotificationRepositoryResult<NotificationRow> {
    Ok(NotificationRow {
        id: notification.id().into_inner(),
        recipient_id: notification.recipient_id().into_inner(),
        task_id: notification.task_id().into_inner(),
        kind: notification.kind().as_str().to_owned(),
        lead_hours: notification
            .lead_hours()
            .map(i32::try_from)
            .transpose()
            .map_err(NotificationRepositoryError::persistence)?,
        message: notification.message().to_owned(),
        scheduled_at: notification.scheduled_at(),
        created_at: notification.created_at(),
        sent_at: notification.sent_at(),
    })
}

fn row_to_notification(row: NotificationRow) -> NotificationRepositoryResult<Notification> {
    let NotificationRow {
        id,
        recipient_id,
        task_id,
        kind: persisted_kind,
        lead_hours,
        message,
        scheduled_at,
        created_at,
        sent_at,
    } = row;

    let kind = NotificationKind::try_from(persisted_kind.as_str())
        .map_err(NotificationRepositoryError::persistence)?;
    let lead = lead_hours
        .map(u32::try_from)
        .transpose()
        .map_err(NotificationRepositoryError::persistence)?;

    Ok(Notification::from_persisted(PersistedNotificationData {
        id: NotificationId::from_uuid(id),
        recipient_id: UserId::from_uuid(recipient_id),
        task_id: TaskId::from_uuid(task_id),
        kind,
        lead_hours: lead,
        message,
        scheduled_at,
        created_at,
        sent_at,
    }))
}
