//! Flight aggregator server.
//!
//! Loads configuration, initializes logging, registers the configured
//! providers and serves the HTTP API until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use flight_aggregator::api::auth::JwtAuth;
use flight_aggregator::api::rest::{AppState, create_router};
use flight_aggregator::application::services::{AggregationConfig, OfferAggregationEngine};
use flight_aggregator::infrastructure::config::AppConfig;
use flight_aggregator::infrastructure::logging::init_tracing;
use flight_aggregator::infrastructure::providers::build_providers;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialize logging")?;

    let providers = build_providers(&config.providers).context("failed to build providers")?;
    let engine = Arc::new(OfferAggregationEngine::new(
        providers,
        AggregationConfig::with_timeout(config.search.timeout())
            .with_cache_ttl(config.search.cache_ttl()),
    ));
    let state = Arc::new(AppState::new(
        engine,
        config.search.stream_interval(),
        JwtAuth::new(&config.auth),
    ));

    let listener = TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(
        addr = %config.server.bind_addr,
        search_timeout_ms = config.search.timeout_ms,
        cache_ttl_ms = config.search.cache_ttl_ms,
        "Server listening"
    );

    let (signalled_tx, mut signalled_rx) = watch::channel(false);
    let server = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        served = &mut server => served.context("server error")?,
        _ = signalled_rx.wait_for(|signalled| *signalled) => {
            let grace = Duration::from_secs(config.server.shutdown_grace_secs);
            info!(grace_secs = grace.as_secs(), "Shutting down, draining connections");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(served) => served.context("server error")?,
                Err(_) => warn!("Grace period elapsed, closing remaining connections"),
            }
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}
