mod catalog;
mod config;
mod error;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod site;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::llm::LlmChat;

const DEFAULT_LOG_FILTER: &str = "songnation_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    // Missing .env is fine; real env vars win either way.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = config::ServerConfig::from_env().expect("invalid server configuration");
    let catalog = catalog::Catalog::builtin().expect("builtin catalog has duplicate slugs");
    tracing::info!(compositions = catalog.all().len(), "catalog loaded");

    // Initialize LLM client (non-fatal: generators answer 503 if config missing).
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), provider = ?client.provider(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, generators disabled");
            None
        }
    };

    // Initialize the document store handle (non-fatal as well).
    let store_handle = match store::StoreConfig::from_env() {
        Ok(Some(store_config)) => {
            let handle = Arc::new(store::StoreHandle::new(store_config));
            tracing::info!(
                documents = handle.documents().root(),
                auth = handle.auth().endpoint(),
                "document store configured"
            );
            Some(handle)
        }
        Ok(None) => {
            tracing::warn!("document store not configured");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "document store config incomplete, store disabled");
            None
        }
    };
    let _permission_listener = store_handle.as_deref().map(store::spawn_permission_listener);

    let rate_limiter = rate_limit::RateLimiter::new(rate_limit::RateLimitConfig::from_env());
    let addr = config.socket_addr();
    let state = state::AppState::new(config, catalog, llm, store_handle, rate_limiter);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");

    tracing::info!(%addr, "songnation listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
