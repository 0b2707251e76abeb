//! Generator routes.
//!
//! Each request is validated, admitted by the rate limiter, and then runs
//! exactly one flow. A failed upstream call is logged and answered with
//! 502; the token reservation is released, or charged with the tokens the
//! call used when the model answered but its output was rejected.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::error;

use super::ClientKey;
use crate::error::ApiError;
use crate::llm::LlmChat;
use crate::services::generation::{FlowOutput, GenerationError};
use crate::services::lyrics::{self, LyricSnippetRequest};
use crate::services::seo::{self, SeoKeywordsRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LyricSnippetResponse {
    pub snippet: String,
}

#[derive(Debug, Serialize)]
pub struct SeoKeywordsResponse {
    pub keywords: String,
    pub keyword_list: Vec<String>,
}

/// `POST /api/ai/lyric-snippet`
pub async fn lyric_snippet(
    State(state): State<AppState>,
    client: ClientKey,
    payload: Result<Json<LyricSnippetRequest>, JsonRejection>,
) -> Result<Json<LyricSnippetResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let input = body.validate().map_err(ApiError::Validation)?;
    let llm = admit(&state, &client)?;

    let result = lyrics::generate_lyric_snippet(llm.as_ref(), &input, state.config.ai_max_tokens).await;
    let output = settle(&state, &client, "lyric_snippet", result)?;
    Ok(Json(LyricSnippetResponse { snippet: output.snippet }))
}

/// `POST /api/ai/seo-keywords`
pub async fn seo_keywords(
    State(state): State<AppState>,
    client: ClientKey,
    payload: Result<Json<SeoKeywordsRequest>, JsonRejection>,
) -> Result<Json<SeoKeywordsResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let input = body.validate().map_err(ApiError::Validation)?;
    let llm = admit(&state, &client)?;

    let result = seo::generate_seo_keywords(llm.as_ref(), &input, state.config.ai_max_tokens).await;
    let output = settle(&state, &client, "seo_keywords", result)?;
    let keyword_list = output.keyword_list();
    Ok(Json(SeoKeywordsResponse { keywords: output.keywords, keyword_list }))
}

// =============================================================================
// HELPERS
// =============================================================================

/// Check the client against every limit and reserve `ai_max_tokens`.
fn admit(state: &AppState, client: &ClientKey) -> Result<Arc<dyn LlmChat>, ApiError> {
    let llm = state.llm.clone().ok_or(ApiError::LlmNotConfigured)?;
    state.rate_limiter.check_and_record(client.as_str())?;
    state
        .rate_limiter
        .reserve_token_budget(client.as_str(), u64::from(state.config.ai_max_tokens))?;
    Ok(llm)
}

/// Settle the reservation and log failures.
fn settle<T>(
    state: &AppState,
    client: &ClientKey,
    flow: &'static str,
    result: Result<FlowOutput<T>, GenerationError>,
) -> Result<T, ApiError> {
    let reserved = u64::from(state.config.ai_max_tokens);
    match result {
        Ok(out) => {
            state.rate_limiter.record_tokens(client.as_str(), out.tokens, reserved);
            Ok(out.output)
        }
        Err(e) => {
            match e.tokens() {
                0 => state.rate_limiter.release_reserved_tokens(client.as_str(), reserved),
                spent => state.rate_limiter.record_tokens(client.as_str(), spent, reserved),
            }
            error!(flow, %client, error = %e, tokens = e.tokens(), "ai: generation failed");
            Err(e.into())
        }
    }
}
