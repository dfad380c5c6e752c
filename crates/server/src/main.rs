use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendrelay_core::{
    load_config, validate_config, DestinationBackend, DestinationClient, HttpPublisher,
    OrchestratorUpdate, OrchestratorUpdateCallback, SimulatedPublisher, SourceBackend,
    SourceClient, TransferOrchestrator, YouTubeClient,
};
use trendrelay_server::api::{create_router, WsBroadcaster};
use trendrelay_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long shutdown waits for an in-flight transfer.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("trendrelay {}", VERSION);

    // Determine config path
    let config_path = std::env::var("TRENDRELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Source client
    let source: Arc<dyn SourceClient> = match config.source.backend {
        SourceBackend::Youtube => {
            info!(
                "Initializing YouTube source (region {}, {} results)",
                config.source.youtube.region_code, config.source.youtube.max_results
            );
            Arc::new(
                YouTubeClient::new(config.source.youtube.clone())
                    .context("Failed to create YouTube client")?,
            )
        }
    };

    // Destination client
    let destination: Arc<dyn DestinationClient> = match config.destination.backend {
        DestinationBackend::Http => {
            let http_config = config
                .destination
                .http()
                .context("destination.base_url is required for the http backend")?;
            info!("Initializing HTTP publisher at {}", http_config.base_url);
            Arc::new(HttpPublisher::new(http_config).context("Failed to create HTTP publisher")?)
        }
        DestinationBackend::Simulated => {
            warn!("Using simulated destination, nothing is actually published");
            Arc::new(SimulatedPublisher::new(config.destination.simulated()))
        }
    };

    // WebSocket broadcaster first so the orchestrator can report through it
    let ws_broadcaster = WsBroadcaster::default();
    let broadcaster_for_callback = ws_broadcaster.clone();
    let update_callback: OrchestratorUpdateCallback =
        Arc::new(move |update: &OrchestratorUpdate| {
            broadcaster_for_callback.publish_update(update);
        });

    let orchestrator = Arc::new(
        TransferOrchestrator::new(config.orchestrator.clone(), source, destination)
            .with_update_callback(update_callback),
    );
    info!("Transfer orchestrator initialized (auto-cycle stopped)");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&orchestrator),
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if tokio::time::timeout(SHUTDOWN_GRACE, orchestrator.shutdown())
        .await
        .is_err()
    {
        warn!(
            "Auto-cycle did not stop within {}s, exiting anyway",
            SHUTDOWN_GRACE.as_secs()
        );
    } else {
        info!("Orchestrator stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
