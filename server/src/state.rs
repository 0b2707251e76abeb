//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Everything in it is immutable after startup except the rate limiter:
//! the catalog is static, the survey path only logs, and the store handle
//! is configuration.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;
use crate::store::StoreHandle;

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; all inner fields are Arc-wrapped or cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub catalog: Arc<Catalog>,
    /// `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// `None` if the document store is not configured.
    pub store: Option<Arc<StoreHandle>>,
    /// Guards the generator endpoints.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: ServerConfig,
        catalog: Catalog,
        llm: Option<Arc<dyn LlmChat>>,
        store: Option<Arc<StoreHandle>>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self { config: Arc::new(config), catalog: Arc::new(catalog), llm, store, rate_limiter }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
