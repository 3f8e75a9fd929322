use dotenvy::dotenv;
use lessonbook::logging::init_tracing;
use lessonbook::metrics::{init_metrics, metrics_app, track_backup};
use lessonbook::modules::backups::service::startup_backup;
use lessonbook::router::init_router;
use lessonbook::state::init_app_state;
use lessonbook_config::{BackupConfig, DatabaseConfig, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server = ServerConfig::from_env();
    init_tracing(&server)?;
    let metrics = init_metrics()?;

    let database = DatabaseConfig::from_env();

    // Copy the database file before the pool opens it.
    match startup_backup(&BackupConfig::from_env(&database)).await {
        Ok(Some(outcome)) => track_backup(outcome.created.is_some(), outcome.pruned.len()),
        Ok(None) => {}
        Err(e) => error!(error = %e, "Startup backup failed"),
    }

    let state = init_app_state(&database).await?;
    let pool = state.db.clone();
    let mut app = init_router(state);
    if let Some(handle) = metrics {
        app = app.merge(metrics_app(handle));
    }

    let listener = tokio::net::TcpListener::bind(server.address()).await?;
    info!(address = %server.address(), env = ?server.env, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", server.address());
    info!("Scalar UI available at http://{}/scalar", server.address());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Closing the last connection checkpoints the WAL into the database file.
    pool.close().await;
    info!("Database pool closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
