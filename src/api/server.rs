use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::info;

use super::{
    services::{
        append_file, create_task, download_archive, get_task, health, list_tasks,
    },
    state::AppState,
};
use crate::builder::ArchiveBuilder;
use crate::config::Config;
use crate::queue::BuildBroker;
use crate::registry::TaskRegistry;
use crate::worker;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the application router.
///
/// Shared between `run` and the integration tests, which drive the
/// router directly without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/files", post(append_file))
        .route("/tasks/{id}/archive", get(download_archive))
        .route("/health", get(health))
        .with_state(state)
        // Automatically decompress gzip request bodies
        .layer(RequestDecompressionLayer::new())
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    let address = address.unwrap_or(config.server.bind_addr);

    let registry = Arc::new(TaskRegistry::new(config.limits.clone()));

    let builder = Arc::new(
        ArchiveBuilder::new(&config)
            .map_err(|e| format!("Failed to build archive builder: {}", e))?,
    );

    // Broker + worker pool: the append that fills a task enqueues a
    // build job; workers consume them off these channels
    let (broker, worker_receivers) =
        BuildBroker::new(config.workers.count, config.workers.channel_size);
    let broker = Arc::new(broker);

    let state = AppState::new(config, registry.clone(), broker);
    worker::spawn_pool(
        worker_receivers,
        registry,
        builder,
        state.metrics.clone(),
    );

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "zipdrop API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
