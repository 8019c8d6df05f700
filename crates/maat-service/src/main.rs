use std::net::SocketAddr;

use tracing::{error, info};

use maat_lib::FinderConfig;
use maat_service::{app, ServiceConfig};
use maat_service_shared::{init_logging, init_metrics, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (reads LOG_FORMAT from environment)
    let logging_config = LoggingConfig::from_env().with_service("maat-service");
    init_logging(&logging_config);

    let config = ServiceConfig::from_env();
    if let Err(e) = init_metrics(&config.metrics) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let finder_config = FinderConfig::from_env();
    info!(
        port = config.port,
        radius_m = finder_config.search_radius_m,
        places_configured = finder_config.has_places_key(),
        "starting restaurant finder service"
    );

    let state = AppState::from_config(&finder_config).map_err(|e| {
        error!(error = %e, "failed to build application state");
        e
    })?;

    let router = app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
