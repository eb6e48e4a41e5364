//! Roster logger service entry point.

use std::sync::Arc;

use roster_core::clock::{Clock, SystemClock};
use roster_core::id::RandomIds;
use roster_core::log_store::LogStore;
use roster_core::queue::MessageQueue;
use roster_employee::application::publisher::QueueEventPublisher;
use roster_logger::application::processor::LogEntryProcessor;
use roster_logger::domain::ports::EventProcessor;
use roster_postgres::pg_employee_repository::PgEmployeeRepository;
use roster_postgres::pg_log_store::PgLogStore;
use roster_postgres::pg_message_queue::PgMessageQueue;
use roster_postgres::schema;
use roster_service::app;
use roster_service::config::ServiceConfig;
use roster_service::consumers::ConsumerPool;
use roster_service::error::AppError;
use roster_service::state::AppState;
use roster_service::telemetry;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServiceConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    info!(
        queue = %config.queue_name,
        consumers = config.consumer_instances,
        otlp = telemetry.exporting(),
        "Starting roster logger service"
    );

    let result = run(&config).await;
    if let Err(err) = &result {
        error!(error = %err, "roster logger service failed");
    }

    telemetry.shutdown();
    result
}

async fn run(config: &ServiceConfig) -> Result<(), AppError> {
    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    schema::migrate(&pool).await.map_err(sqlx::Error::from)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids = Arc::new(RandomIds);
    let queue: Arc<dyn MessageQueue> =
        Arc::new(PgMessageQueue::new(pool.clone(), config.queue_name.clone()));
    let log_store: Arc<dyn LogStore> = Arc::new(PgLogStore::new(pool.clone()));
    let processor: Arc<dyn EventProcessor> = Arc::new(LogEntryProcessor::new(
        Arc::clone(&log_store),
        Arc::clone(&clock),
        ids.clone(),
    ));

    let shutdown = CancellationToken::new();
    let consumers = ConsumerPool::spawn(config, &queue, &processor, &shutdown);

    let app_state = AppState::new(
        config.queue_name.as_str(),
        Arc::clone(&clock),
        ids,
        log_store,
        Arc::new(PgEmployeeRepository::new(pool)),
        Arc::new(QueueEventPublisher::new(queue, clock)),
    );
    let router = app::router(app_state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    let serve_shutdown = shutdown.clone();
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            serve_shutdown.cancel();
        })
        .await;

    // The server can also stop on an I/O error; consumers must stop either way.
    shutdown.cancel();
    let report = consumers.join().await;
    info!(
        iterations = report.iterations,
        received = report.received,
        acknowledged = report.acknowledged,
        acknowledge_failures = report.acknowledge_failures,
        rejected = report.rejected,
        malformed = report.malformed,
        quarantined = report.quarantined,
        receive_failures = report.receive_failures,
        "consumers stopped"
    );

    served?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
