//! Express Checkout service entry point.
//!
//! Loads configuration, initializes logging, connects to PostgreSQL, loads
//! the signing key, starts the stale transaction sweep and serves the API
//! until SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use express_checkout::adapters::http::{build_app, CheckoutAppState};
use express_checkout::adapters::{
    KeyStoreSigner, PlexoGatewayClient, PostgresProductCatalog, PostgresTransactionRepository,
};
use express_checkout::application::{
    PollRetryPolicy, PollTransactionStatusHandler, ReconcileStaleTransactionsHandler,
    StaleSweepConfig,
};
use express_checkout::config::{AppConfig, ServerConfig};
use express_checkout::ports::{ProductCatalog, TransactionRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&config.server);
    config.validate().context("invalid configuration")?;

    tracing::info!(
        environment = ?config.server.environment,
        gateway = %config.gateway.base_url,
        "starting express-checkout"
    );

    // --- Database ---
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("database migrations applied");
    }

    // --- Gateway ---
    let signer = Arc::new(KeyStoreSigner::new(
        config.gateway.keystore_path.clone(),
        config.gateway.keystore_password.clone(),
    ));
    signer
        .preload()
        .context("failed to load signing key from keystore")?;
    let gateway = Arc::new(
        PlexoGatewayClient::new(config.gateway.clone(), signer)
            .context("failed to build gateway client")?,
    );

    // --- Application state ---
    let repository: Arc<dyn TransactionRepository> =
        Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let catalog: Arc<dyn ProductCatalog> = Arc::new(PostgresProductCatalog::new(pool.clone()));
    let poll_retry = PollRetryPolicy {
        attempts: config.reconciliation.poll_retry_attempts,
        backoff: config.reconciliation.poll_retry_backoff(),
    };
    let state = CheckoutAppState::new(repository.clone(), catalog, gateway.clone(), poll_retry);

    // --- Stale sweep ---
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_task = if config.reconciliation.sweep_enabled {
        let poller = Arc::new(PollTransactionStatusHandler::new(
            repository.clone(),
            gateway,
            state.engine.clone(),
            poll_retry,
        ));
        let sweep = ReconcileStaleTransactionsHandler::new(
            repository,
            poller,
            StaleSweepConfig {
                stale_after: std::time::Duration::from_secs(config.reconciliation.stale_after_secs),
                interval: config.reconciliation.sweep_interval(),
                batch_size: config.reconciliation.sweep_batch_size,
            },
        );
        Some(tokio::spawn(async move { sweep.run(shutdown_rx).await }))
    } else {
        None
    };

    // --- Serve ---
    let addr = config
        .server
        .socket_addr()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", addr))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, build_app(state, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    if let Some(task) = sweep_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "stale sweep task failed");
        }
    }
    pool.close().await;
    tracing::info!("express-checkout stopped");
    Ok(())
}

/// JSON lines in production, human-readable otherwise. `RUST_LOG` overrides
/// the configured level.
fn init_logging(server: &ServerConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Waits for SIGINT or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}
