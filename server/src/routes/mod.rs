//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router carries the JSON API under `/api`, a health check, and
//! (when `WEBSITE_DIR` is set) the static landing site as the fallback.
//! Without a site directory, unknown paths answer with the JSON error
//! envelope.

pub mod ai;
pub mod catalog;
pub mod site;
pub mod surveys;

use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::Router;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let website_dir = state.config.website_dir.clone();

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/site", get(site::get_site))
        .route("/api/genres", get(catalog::list_genres))
        .route("/api/compositions", get(catalog::list_compositions))
        .route("/api/compositions/{slug}", get(catalog::get_composition))
        .route("/api/compositions/{slug}/license", get(catalog::get_license))
        .route("/api/slugs", get(catalog::list_slugs))
        .route("/api/ai/lyric-snippet", post(ai::lyric_snippet))
        .route("/api/ai/seo-keywords", post(ai::seo_keywords))
        .route("/api/surveys", get(surveys::list_surveys))
        .route("/api/surveys/{audience}", post(surveys::submit_survey))
        .route("/api/store/config", get(site::store_config))
        .route("/api/store/permission-errors", post(site::report_permission_error))
        .with_state(state);

    let router = match website_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router.fallback(not_found),
    };

    router
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> ApiError {
    ApiError::NotFound("route".into())
}

// =============================================================================
// CLIENT KEY EXTRACTOR
// =============================================================================

/// Rate-limit key for the caller: the peer address, or the first
/// `X-Forwarded-For` hop when the peer is a trusted proxy. Without connect
/// info (router served bare) the key is `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl ClientKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_parts(parts: &Parts, trusted_proxies: &[IpAddr]) -> Self {
        let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() else {
            return Self("unknown".into());
        };
        let peer = peer.ip();
        if trusted_proxies.contains(&peer) {
            let forwarded = parts
                .headers
                .get(FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(hop) = forwarded {
                return Self(hop.to_string());
            }
        }
        Self(peer.to_string())
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, &state.config.trusted_proxies))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
