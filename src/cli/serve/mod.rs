//! Serve command - runs the identity HTTP API

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Run the API server until a shutdown signal arrives
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init_logging(&config.logging);

    // Missing or unreadable key material aborts startup here
    let state = crate::create_app_state_with_config(&config).await?;
    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(issuer = %config.jwt.issuer, "Starting identity API on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);

    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            let _ = shutdown_rx.changed().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(?grace, "In-flight requests did not finish in time, closing connections");
        }
    }

    info!("Identity API shutdown complete");

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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid server.host '{}'", config.server.host))?;

    Ok(SocketAddr::from((ip, config.server.port)))
}
