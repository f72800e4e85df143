use std::sync::Arc;

use tinylink::{
    codegen::RandomCodes,
    config::{AppConfig, StoreBackend},
    store::{LinkStore, MemoryLinkStore, SqliteLinkStore},
    AppState, LinkService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tinylink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting tinylink on {}", config.bind_addr());
    tracing::info!("Owner scoping: {:?}", config.owner_scoping);

    // Store lives for the whole process and is closed after the server stops
    let store: Arc<dyn LinkStore> = match config.store {
        StoreBackend::Sqlite => {
            let store = SqliteLinkStore::connect(&config.database_url).await?;
            tracing::info!("Connected to {}", config.database_url);
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; links are lost on restart");
            Arc::new(MemoryLinkStore::new())
        }
    };

    let service = LinkService::new(store, Arc::new(RandomCodes::new()), config.owner_scoping);
    let state = Arc::new(AppState {
        service: service.clone(),
    });
    let app = tinylink::router(state);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown().await;
    tracing::info!("Store closed, bye");

    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
