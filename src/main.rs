use anyhow::Context;
use tracing_subscriber::EnvFilter;

use catalog_api::app::{self, AppState};
use catalog_api::auth;
use catalog_api::config::AppConfig;
use catalog_api::database::Database;
use catalog_api::mail;
use catalog_api::reports::ReportScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Catalog API in {:?} mode", config.environment);

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    auth::bootstrap_admin(&db, &config.admin).await?;

    let transport = mail::transport_from_config(&config.mail)?;
    tracing::info!(transport = transport.name(), "mail transport ready");

    let state = AppState::new(config, db.clone(), transport)?;
    let scheduler = state
        .config
        .report
        .enabled
        .then(|| ReportScheduler::spawn(state.reports.clone(), state.config.report.interval()));

    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Catalog API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
