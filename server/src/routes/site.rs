//! Site description and the client-facing store surface.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::site::{SiteInfo, site_info};
use crate::state::AppState;
use crate::store::{AuthContext, PublicStoreConfig, SecurityRuleContext};

/// `GET /api/site`
pub async fn get_site(State(state): State<AppState>) -> Json<SiteInfo> {
    Json(site_info(&state.catalog, &state.config))
}

/// `GET /api/store/config`: 503 when the store is not configured.
pub async fn store_config(State(state): State<AppState>) -> Result<Json<PublicStoreConfig>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::StoreNotConfigured)?;
    Ok(Json(store.public_config()))
}

/// A request the security rules refused, as seen by the browser.
#[derive(Debug, Deserialize)]
pub struct PermissionErrorReport {
    #[serde(flatten)]
    pub context: SecurityRuleContext,
    #[serde(default)]
    pub auth: Option<AuthContext>,
}

#[derive(Debug, Serialize)]
pub struct PermissionErrorAck {
    pub message: String,
}

/// `POST /api/store/permission-errors`: publish a denied request to the
/// permission listener. Answers 202 with the rendered message.
pub async fn report_permission_error(
    State(state): State<AppState>,
    payload: Result<Json<PermissionErrorReport>, JsonRejection>,
) -> Result<(StatusCode, Json<PermissionErrorAck>), ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::StoreNotConfigured)?;
    let Json(report) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if report.context.path.trim_matches('/').is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new("path", "Document path is required.")]));
    }
    let err = store.report_permission_denied(report.context, report.auth);
    Ok((StatusCode::ACCEPTED, Json(PermissionErrorAck { message: err.to_string() })))
}
