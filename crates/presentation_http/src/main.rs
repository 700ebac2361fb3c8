//! Rooster HTTP server binary

use std::{sync::Arc, time::Duration};

use application::{FeedRefreshConfig, FeedRefreshService, FreshnessOutcome, RosterService};
use axum::{
    Router,
    http::{HeaderValue, Method},
};
use infrastructure::{
    AppConfig, FeedFetcherAdapter, FileCacheAdapter, IcsParserAdapter, ServerConfig,
    TelemetryConfig, init_telemetry,
};
use presentation_http::{AppState, RequestIdLayer, create_router};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // no config means no log settings either; report with the defaults
            let _ = init_telemetry(&TelemetryConfig::default());
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        },
    };

    init_telemetry(&config.telemetry())?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting rooster server");

    let fetcher = Arc::new(FeedFetcherAdapter::new(config.feed.client_config())?);
    let cache = Arc::new(FileCacheAdapter::new(config.feed.cache_path.clone()));
    let parser = Arc::new(IcsParserAdapter::new(config.feed.ics_parser()?));

    let refresher = Arc::new(FeedRefreshService::new(
        FeedRefreshConfig::new(config.feed.url.clone()).with_ttl(config.feed.ttl()),
        fetcher,
        cache,
        parser,
    ));

    match refresher.initialize().await {
        FreshnessOutcome::Refreshed { events } => info!(events, "Roster loaded"),
        FreshnessOutcome::Fresh => info!("Roster already current"),
        FreshnessOutcome::Failed { error } => {
            warn!(%error, data = %refresher.data_status(), "Initial feed refresh failed, serving what is available");
        },
    }

    let roster_service =
        RosterService::new(refresher).with_max_attendees(config.roster.max_attendees);
    let app = with_middleware(create_router(AppState::new(roster_service)), &config.server);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Server listening");

    let shutdown_timeout = Duration::from_secs(
        config
            .server
            .shutdown_timeout_secs
            .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signalled_tx.send(());
            })
            .await
    };
    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => {
                info!(timeout = ?shutdown_timeout, "Waiting for connections to close");
                tokio::time::sleep(shutdown_timeout).await;
            },
            // server stopped without a signal
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => result?,
        () = drain_deadline => warn!("Shutdown timeout elapsed, dropping open connections"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wrap the router in tracing, CORS and request-id layers
///
/// The request-id layer is added last so it is outermost and its span covers
/// everything below it.
fn with_middleware(router: Router, server: &ServerConfig) -> Router {
    let mut app = router.layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        let cors = if server.allowed_origins.is_empty() {
            CorsLayer::new().allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = server
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new().allow_origin(origins)
        };
        app = app.layer(cors.allow_methods([Method::GET]).allow_headers(Any));
    }

    app.layer(RequestIdLayer::new())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
