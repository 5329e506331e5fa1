//! `PostgreSQL` repository implementation for users.

use super::{models::UserRow, schema::users};
use crate::user::{
    domain::{DisplayName, ExternalId, PersistedUserData, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by user adapters.
pub type UserPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: UserPgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: UserPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserRepositoryError::persistence)?
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let external_id = user.external_id();
        let row = to_row(user);
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateExternalId(external_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::external_id.eq(external_id.value()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn touch(&self, id: UserId, at: DateTime<Utc>) -> UserRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.filter(users::id.eq(id.into_inner())))
                .set(users::last_activity.eq(at))
                .execute(connection)
                .map_err(UserRepositoryError::persistence)?;
            if updated == 0 {
                return Err(UserRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_active(&self, role: Option<Role>) -> UserRepositoryResult<Vec<User>> {
        self.run_blocking(move |connection| {
            let mut query = users::table.filter(users::active.eq(true)).into_boxed();
            if let Some(wanted) = role {
                query = query.filter(users::role.eq(wanted.as_str()));
            }
            let rows = query
                .order(users::registered_at.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }
}

fn to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id().into_inner(),
        external_id: user.external_id().value(),
        display_name: user.display_name().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        active: user.is_active(),
        registered_at: user.registered_at(),
        last_activity: user.last_activity(),
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let role = Role::try_from(row.role.as_str()).map_err(UserRepositoryError::persistence)?;
    let display_name =
        DisplayName::new(row.display_name).map_err(UserRepositoryError::persistence)?;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        external_id: ExternalId::new(row.external_id),
        display_name,
        role,
        active: row.active,
        registered_at: row.registered_at,
        last_activity: row.last_activity,
    }))
}
