//! Runs the deadline sweep and notification scheduler against PostgreSQL.
//!
//! Usage:
//!
//! ```text
//! taskdesk-scheduler [--config <path>]
//! ```
//!
//! Settings come from the optional TOML file and `TASKDESK_*` environment
//! variables. Notifications are written to the log; a chat transport plugs in
//! through the same dispatcher port. The process stops on Ctrl+C after the
//! current tick and any in-flight delivery.

use camino::Utf8PathBuf;
use clap::Parser;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use taskdesk::config::{self, AppConfig};
use taskdesk::notification::adapters::logging::LoggingDispatcher;
use taskdesk::notification::adapters::postgres::PostgresNotificationRepository;
use taskdesk::notification::ports::NotificationDispatcher;
use taskdesk::notification::services::{NotificationEventHandler, NotificationScheduler};
use taskdesk::task::adapters::events::CompositeEventSink;
use taskdesk::task::adapters::postgres::PostgresTaskRepository;
use taskdesk::task::ports::TaskEventSink;
use taskdesk::task::services::TaskLifecycleService;
use taskdesk::telemetry;
use taskdesk::user::adapters::postgres::PostgresUserRepository;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Deadline sweep and notification scheduler.
#[derive(Parser, Debug)]
#[command(name = "taskdesk-scheduler", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref())?;
    telemetry::init_tracing(&settings.logging.level)?;
    info!(config = ?cli.config, "configuration loaded");

    let (scheduler, handler) = build_scheduler(&settings)?;
    let cancel = CancellationToken::new();
    tokio::spawn(stop_on_ctrl_c(cancel.clone()));

    scheduler.run(cancel).await;
    handler.wait_for_deliveries().await;
    info!("scheduler stopped");
    Ok(())
}

type Scheduler = NotificationScheduler<
    PostgresTaskRepository,
    PostgresUserRepository,
    PostgresNotificationRepository,
    DefaultClock,
>;

type Handler = NotificationEventHandler<PostgresNotificationRepository, DefaultClock>;

fn build_scheduler(settings: &AppConfig) -> Result<(Scheduler, Arc<Handler>), BoxError> {
    let manager = ConnectionManager::<PgConnection>::new(settings.storage.database_url.as_str());
    let pool = Pool::builder()
        .max_size(settings.storage.pool_size)
        .build(manager)?;

    let clock = Arc::new(DefaultClock);
    let renderer = settings.message_renderer()?;
    let scheduler_settings = settings.scheduler.settings();
    let notifications = Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(LoggingDispatcher);

    let handler = Arc::new(NotificationEventHandler::new(
        Arc::clone(&notifications),
        Arc::clone(&dispatcher),
        Arc::clone(&clock),
        renderer.clone(),
        scheduler_settings.dispatch_timeout,
    ));
    let events: Arc<dyn TaskEventSink> =
        Arc::new(CompositeEventSink::new().with_sink(Arc::clone(&handler) as Arc<dyn TaskEventSink>));

    let lifecycle = Arc::new(TaskLifecycleService::new(
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
        events,
        Arc::clone(&clock),
        settings.lifecycle_settings()?,
    ));

    let scheduler = NotificationScheduler::new(
        lifecycle,
        notifications,
        dispatcher,
        clock,
        renderer,
        scheduler_settings,
    );
    Ok((scheduler, handler))
}

async fn stop_on_ctrl_c(cancel: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl+C; stopping");
    }
    info!("shutdown requested");
    cancel.cancel();
}
