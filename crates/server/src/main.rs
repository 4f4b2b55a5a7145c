use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glimpse_core::{
    load_config, validate_config, ContentModerator, ImageProcessor, MemoryTaskStore,
    OpenAiCompatClient, TaskStore, VisionClient,
};

use glimpse_server::api::create_router;
use glimpse_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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

    // Determine config path
    let config_path = std::env::var("GLIMPSE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Vision endpoint: {}", config.vision.base_url);
    info!("Vision model: {}", config.vision.model);
    if config.vision.api_key.as_deref().unwrap_or_default().is_empty() {
        error!("No vision API key configured; every analysis will fail until one is provided");
    }

    // Create the vision client shared by the pipeline and the moderator
    let vision_client: Arc<dyn VisionClient> =
        Arc::new(OpenAiCompatClient::from_config(&config.vision));

    // Create the in-memory task store
    let task_store: Arc<dyn TaskStore> =
        Arc::new(MemoryTaskStore::with_max_records(config.tasks.max_records));
    info!(
        "Task store initialized (max {} records)",
        config.tasks.max_records
    );

    // Create the processing pipeline and moderator
    let processor = Arc::new(
        ImageProcessor::new(Arc::clone(&vision_client))
            .with_temperature(config.vision.temperature),
    );
    let moderator = Arc::new(ContentModerator::new(Arc::clone(&vision_client)));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        task_store,
        processor,
        moderator,
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

    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
