use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use service::{
    ids::UuidGenerator,
    storage::{BlobStore, FsBlobStore, MemoryBlobStore},
    users::UserHandlers,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Construct the configured blob store backend.
pub async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn BlobStore>, StartupError> {
    let store: Arc<dyn BlobStore> = match cfg.storage.backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "user records will not survive a restart");
            MemoryBlobStore::new()
        }
        StorageBackend::Fs => {
            common::env::ensure_data_dir(&cfg.storage.root).await?;
            let store = FsBlobStore::new(&cfg.storage.root)
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            info!(backend = "fs", root = %store.root().display(), "using file blob store");
            store
        }
    };
    Ok(store)
}

/// Build the router with every collaborator wired in.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = build_store(cfg).await?;
    let users = UserHandlers::new(store, Arc::new(UuidGenerator));
    Ok(routes::build_router(users, build_cors()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting user service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
