use std::time::Duration;

use anyhow::Result;
use carpool_api::{
    app,
    config::Config,
    jobs::{sweep_expired_events, CleanupExpiredEventsJob, JobScheduler, ReconcileSeatsJob},
    middleware,
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting carpool API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;
    persistence::db::run_migrations(&pool).await?;

    let grace_hours = config.maintenance.expired_event_grace_hours;
    match sweep_expired_events(&pool, grace_hours).await {
        Ok(deleted) => info!(deleted, "Startup cleanup of expired events done"),
        Err(e) => warn!(error = %e, "Startup cleanup of expired events failed"),
    }

    let mut scheduler = JobScheduler::new();
    scheduler.register(CleanupExpiredEventsJob::new(
        pool.clone(),
        &config.maintenance,
    ));
    scheduler.register(ReconcileSeatsJob::new(
        pool.clone(),
        config.maintenance.reconcile_interval_minutes,
    ));
    scheduler.start();

    let app = app::create_app(config.clone(), pool);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
