//! Per-test database setup for the `PostgreSQL` adapter tests.

use crate::postgres::cluster::{BoxError, CleanupGuard, PostgresCluster, postgres_cluster};
use crate::test_helpers::{ManualClock, base_instant, register};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use rstest::fixture;
use taskdesk::notification::adapters::postgres::PostgresNotificationRepository;
use taskdesk::task::adapters::postgres::PostgresTaskRepository;
use taskdesk::user::{adapters::postgres::PostgresUserRepository, domain::Role, domain::UserId};
use tokio::runtime::Runtime;

const SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-03-01-000000_create_taskdesk/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "taskdesk_test_template";

/// Builds the runtime that drives repository futures in synchronous tests.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(SCHEMA_SQL)
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the migrated template exists on the shared cluster.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    let connection = cluster.connection();
    cluster.ensure_template_exists(TEMPLATE_DB, |db_name| {
        apply_migrations(&connection.database_url(db_name))
    })
}

/// Repositories over one fresh database, plus two seeded users.
pub struct PgContext {
    pub tasks: PostgresTaskRepository,
    pub users: PostgresUserRepository,
    pub notifications: PostgresNotificationRepository,
    pub clock: ManualClock,
    pub admin: UserId,
    pub worker: UserId,
    pub rt: Runtime,
    guard: CleanupGuard,
}

impl PgContext {
    /// Releases pooled connections and drops the database.
    pub fn cleanup(self) {
        let Self {
            tasks,
            users,
            notifications,
            guard,
            ..
        } = self;
        drop(tasks);
        drop(users);
        drop(notifications);
        guard.cleanup().expect("cleanup database");
    }
}

#[fixture]
pub fn pg_context(postgres_cluster: PostgresCluster) -> PgContext {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let db_name = format!("test_{}", uuid::Uuid::new_v4().simple());
    cluster
        .create_database_from_template(&db_name, TEMPLATE_DB)
        .expect("database from template");
    let guard = CleanupGuard::new(cluster, db_name);

    let manager = ConnectionManager::<PgConnection>::new(
        cluster.connection().database_url(guard.db_name()),
    );
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("connection pool");
    let tasks = PostgresTaskRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let notifications = PostgresNotificationRepository::new(pool);

    let rt = test_runtime().expect("tokio runtime");
    let clock = ManualClock::new(base_instant());
    let admin = rt
        .block_on(register(&users, &clock, 1, "Dispatcher", Role::Admin))
        .expect("admin registration");
    let worker = rt
        .block_on(register(&users, &clock, 2, "Alice", Role::Worker))
        .expect("worker registration");

    PgContext {
        tasks,
        users,
        notifications,
        clock,
        admin,
        worker,
        rt,
        guard,
    }
}
