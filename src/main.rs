use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use devconnect_api::app::app;
use devconnect_api::config::{AppConfig, StoreBackend};
use devconnect_api::state::AppState;
use devconnect_api::store::memory::MemoryStore;
use devconnect_api::store::postgres::PgStore;
use devconnect_api::store::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, DEVCONNECT_* etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Arc::new(AppConfig::from_env());
    tracing::info!("Starting DevConnect API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Postgres => Arc::new(
            PgStore::connect(&config.store)
                .await
                .context("failed to connect to the document store")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; documents will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(config.clone(), store);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("DevConnect API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
