use super::*;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::ServerConfig;
use crate::llm::types::LlmError;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::test_helpers::{self, MockLlm, tool_response};

/// Serve `app(state)` on an ephemeral port and return its base URL.
async fn spawn(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

async fn get(base: &str, path: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn post(base: &str, path: &str, body: &Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

fn lyric_body() -> Value {
    json!({ "genre": "Sertanejo", "style": "saudade da roça" })
}

// =============================================================================
// basics
// =============================================================================

#[tokio::test]
async fn healthz_is_ok() {
    let base = spawn(test_helpers::test_app_state()).await;
    let resp = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/nope").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "E_NOT_FOUND");
}

#[tokio::test]
async fn website_dir_serves_static_fallback() {
    let dir = std::env::temp_dir().join(format!("songnation-site-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>SONGNATION</h1>").unwrap();

    let mut state = test_helpers::test_app_state();
    state.config = Arc::new(ServerConfig { website_dir: Some(dir.clone()), ..ServerConfig::default() });
    let base = spawn(state).await;

    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.text().await.unwrap().contains("SONGNATION"));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn site_describes_landing_page() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/site").await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "SONGNATION");
    assert_eq!(body["nav"].as_array().unwrap().len(), 3);
    assert_eq!(body["surveys"][1]["audience"], "buyer");
}

// =============================================================================
// catalog
// =============================================================================

#[tokio::test]
async fn genres_carry_icons_and_counts() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/genres").await;
    assert_eq!(status, 200);
    assert_eq!(body[0], json!({ "genre": "Sertanejo", "icon": "cowboy-hat", "count": 2 }));
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn compositions_filter_by_genre() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/compositions?genre=trap").await;
    assert_eq!(status, 200);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|c| c["genre"] == "Trap"));
}

#[tokio::test]
async fn compositions_search_and_list_all() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (_, all) = get(&base, "/api/compositions").await;
    assert_eq!(all.as_array().unwrap().len(), 12);

    let (_, found) = get(&base, "/api/compositions?q=ZILLA").await;
    let found = found.as_array().unwrap();
    assert!(!found.is_empty());
    assert!(found.iter().all(|c| c["artist"].as_str().unwrap().to_lowercase().contains("zilla")));
}

#[tokio::test]
async fn unknown_genre_filter_is_bad_request() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/compositions?genre=rock").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "E_BAD_REQUEST");
}

#[tokio::test]
async fn composition_detail_includes_icon_and_image() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/compositions/poeira-da-estrada-por-leo-santos").await;
    assert_eq!(status, 200);
    assert_eq!(body["slug"], "poeira-da-estrada-por-leo-santos");
    assert_eq!(body["icon"], "cowboy-hat");
    assert_eq!(body["image"]["id"], body["image_id"]);
}

#[tokio::test]
async fn unknown_slug_is_404() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/compositions/does-not-exist").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "E_NOT_FOUND");
    let (status, _) = get(&base, "/api/compositions/does-not-exist/license").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn license_quote_is_static() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/compositions/noite-paulistana-por-mc-zilla/license").await;
    assert_eq!(status, 200);
    assert_eq!(body["price"]["amount_cents"], 1_000_000);
    assert_eq!(body["price"]["display"], "R$ 10,000.00");
    assert_eq!(body["final_sale"], true);
}

#[tokio::test]
async fn slugs_list_every_record() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/slugs").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 12);
}

// =============================================================================
// generators
// =============================================================================

#[tokio::test]
async fn lyric_snippet_validation_lists_fields() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = post(&base, "/api/ai/lyric-snippet", &json!({ "genre": "", "style": "x" })).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "E_VALIDATION");
    let fields = body["error"]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["field"], "genre");
    assert_eq!(fields[1]["message"], "Style must be at least 3 characters.");
}

#[tokio::test]
async fn lyric_snippet_without_llm_is_503() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = post(&base, "/api/ai/lyric-snippet", &lyric_body()).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "E_LLM_NOT_CONFIGURED");
}

#[tokio::test]
async fn lyric_snippet_returns_generated_text() {
    let llm = Arc::new(MockLlm::new(vec![Ok(tool_response(
        "emit_lyric_snippet",
        json!({ "snippet": "Poeira na estrada, saudade no peito" }),
    ))]));
    let base = spawn(test_helpers::test_app_state_with_llm(llm.clone())).await;

    let (status, body) = post(&base, "/api/ai/lyric-snippet", &lyric_body()).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "snippet": "Poeira na estrada, saudade no peito" }));
    assert_eq!(llm.calls()[0].max_tokens, 1024);
}

#[tokio::test]
async fn upstream_failure_is_502_and_server_keeps_serving() {
    let llm = Arc::new(MockLlm::new(vec![Err(LlmError::ApiResponse { status: 500, body: "boom".into() })]));
    let state = test_helpers::test_app_state_with_llm(llm);
    let catalog = state.catalog.clone();
    let base = spawn(state).await;

    let (status, body) = post(&base, "/api/ai/lyric-snippet", &lyric_body()).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "E_LLM_ERROR");
    assert_eq!(body["error"]["retryable"], true);

    let (status, _) = get(&base, "/api/slugs").await;
    assert_eq!(status, 200);
    assert_eq!(catalog.all().len(), 12);
}

#[tokio::test]
async fn seo_keywords_returns_list() {
    let llm = Arc::new(MockLlm::new(vec![Ok(tool_response(
        "emit_seo_keywords",
        json!({ "keywords": "gospel, louvor, adoração" }),
    ))]));
    let base = spawn(test_helpers::test_app_state_with_llm(llm)).await;

    let body = json!({ "title": "Paz no Coração", "genre": "Gospel", "description": "Uma canção de louvor e gratidão." });
    let (status, body) = post(&base, "/api/ai/seo-keywords", &body).await;
    assert_eq!(status, 200);
    assert_eq!(body["keywords"], "gospel, louvor, adoração");
    assert_eq!(body["keyword_list"], json!(["gospel", "louvor", "adoração"]));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let base = spawn(test_helpers::test_app_state()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/ai/seo-keywords"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

fn limited_state(trusted_proxies: Vec<std::net::IpAddr>) -> (AppState, Arc<MockLlm>) {
    let llm = Arc::new(MockLlm::new(vec![
        Ok(tool_response("emit_lyric_snippet", json!({ "snippet": "um" }))),
        Ok(tool_response("emit_lyric_snippet", json!({ "snippet": "dois" }))),
    ]));
    let mut state = test_helpers::test_app_state_with_llm(llm.clone());
    state.config = Arc::new(ServerConfig { trusted_proxies, ..ServerConfig::default() });
    state.rate_limiter = RateLimiter::new(RateLimitConfig { per_client_limit: 1, ..RateLimitConfig::default() });
    (state, llm)
}

async fn send_forwarded(base: &str, forwarded_for: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/ai/lyric-snippet"))
        .header("x-forwarded-for", forwarded_for)
        .json(&lyric_body())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn generator_is_rate_limited_per_client() {
    let (state, _) = limited_state(vec!["127.0.0.1".parse().unwrap()]);
    let base = spawn(state).await;

    assert_eq!(send_forwarded(&base, "203.0.113.1").await.status().as_u16(), 200);
    let limited = send_forwarded(&base, "203.0.113.1").await;
    assert_eq!(limited.status().as_u16(), 429);
    let body: Value = limited.json().await.unwrap();
    assert_eq!(body["error"]["code"], "E_RATE_LIMITED");
    assert_eq!(send_forwarded(&base, "203.0.113.2").await.status().as_u16(), 200);
}

#[tokio::test]
async fn forwarded_header_from_untrusted_peer_is_ignored() {
    let (state, llm) = limited_state(Vec::new());
    let base = spawn(state).await;

    let mut statuses = Vec::new();
    for i in 0..5 {
        statuses.push(send_forwarded(&base, &format!("198.51.100.{i}")).await.status().as_u16());
    }
    assert_eq!(statuses, vec![200, 429, 429, 429, 429]);
    assert_eq!(llm.calls().len(), 1);
}

#[tokio::test]
async fn rejected_output_is_charged_to_token_budget() {
    let llm = Arc::new(MockLlm::new(vec![
        Ok(tool_response("emit_lyric_snippet", json!({ "snippet": "  " }))),
        Ok(tool_response("emit_lyric_snippet", json!({ "snippet": "nunca" }))),
    ]));
    let mut state = test_helpers::test_app_state_with_llm(llm.clone());
    state.rate_limiter = RateLimiter::new(RateLimitConfig { token_budget: 1050, ..RateLimitConfig::default() });
    let base = spawn(state).await;

    let (status, body) = post(&base, "/api/ai/lyric-snippet", &lyric_body()).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "E_EMPTY_OUTPUT");

    let (status, body) = post(&base, "/api/ai/lyric-snippet", &lyric_body()).await;
    assert_eq!(status, 429);
    assert_eq!(body["error"]["code"], "E_RATE_LIMITED");
    assert_eq!(llm.calls().len(), 1);
}

// =============================================================================
// surveys + store
// =============================================================================

#[tokio::test]
async fn surveys_list_both_audiences() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/surveys").await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["audience"], "creator");
    assert_eq!(body[1]["submit_path"], "/api/surveys/buyer");
}

#[tokio::test]
async fn survey_submission_is_accepted() {
    let base = spawn(test_helpers::test_app_state()).await;
    let submission = json!({ "email": "leo@example.com", "genres": ["Sertanejo"], "interest": 5 });
    let (status, body) = post(&base, "/api/surveys/creator", &submission).await;
    assert_eq!(status, 202);
    assert_eq!(body["audience"], "creator");
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn invalid_survey_reports_fields() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = post(&base, "/api/surveys/buyer", &json!({ "email": "nope", "interest": 9 })).await;
    assert_eq!(status, 422);
    let fields: Vec<&str> =
        body["error"]["fields"].as_array().unwrap().iter().map(|f| f["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["email", "genres", "interest"]);
}

#[tokio::test]
async fn unknown_survey_audience_is_404() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, _) = post(&base, "/api/surveys/listener", &json!({})).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn store_config_requires_store() {
    let base = spawn(test_helpers::test_app_state()).await;
    let (status, body) = get(&base, "/api/store/config").await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "E_STORE_NOT_CONFIGURED");

    let base = spawn(test_helpers::test_app_state_with_store()).await;
    let (status, body) = get(&base, "/api/store/config").await;
    assert_eq!(status, 200);
    assert_eq!(body["projectId"], "songnation-test");
}

#[tokio::test]
async fn permission_error_reaches_listener() {
    let state = test_helpers::test_app_state_with_store();
    let mut rx = state.store.as_ref().unwrap().subscribe_permission_errors();
    let base = spawn(state).await;

    let report = json!({
        "path": "surveys/creator-1",
        "operation": "create",
        "request_resource_data": { "interest": 5 },
        "auth": { "uid": "u1", "token": { "email": "ana@example.com" } },
    });
    let (status, body) = post(&base, "/api/store/permission-errors", &report).await;
    assert_eq!(status, 202);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Missing or insufficient permissions"));
    assert!(message.contains("/databases/(default)/documents/surveys/creator-1"));

    let denied = rx.recv().await.unwrap();
    assert_eq!(denied.context.path, "surveys/creator-1");
    assert_eq!(denied.auth.unwrap().uid, "u1");
}

#[tokio::test]
async fn permission_error_requires_store_and_path() {
    let report = json!({ "path": "/", "operation": "get" });

    let base = spawn(test_helpers::test_app_state()).await;
    let (status, _) = post(&base, "/api/store/permission-errors", &report).await;
    assert_eq!(status, 503);

    let base = spawn(test_helpers::test_app_state_with_store()).await;
    let (status, body) = post(&base, "/api/store/permission-errors", &report).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["fields"][0]["field"], "path");

    let (status, _) = post(&base, "/api/store/permission-errors", &json!({ "path": "a", "operation": "peek" })).await;
    assert_eq!(status, 400);
}

// =============================================================================
// ClientKey
// =============================================================================

fn parts(forwarded: Option<&str>, peer: Option<&str>) -> Parts {
    let mut builder = axum::http::Request::builder();
    if let Some(value) = forwarded {
        builder = builder.header(FORWARDED_FOR, value);
    }
    let mut parts = builder.body(()).unwrap().into_parts().0;
    if let Some(peer) = peer {
        parts.extensions.insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
    }
    parts
}

fn proxies() -> Vec<IpAddr> {
    vec!["10.0.0.1".parse().unwrap()]
}

#[test]
fn client_key_uses_first_hop_behind_trusted_proxy() {
    let key = ClientKey::from_parts(&parts(Some(" 203.0.113.9 , 10.0.0.1"), Some("10.0.0.1:443")), &proxies());
    assert_eq!(key.as_str(), "203.0.113.9");
}

#[test]
fn client_key_ignores_forwarded_from_untrusted_peer() {
    let key = ClientKey::from_parts(&parts(Some("203.0.113.9"), Some("192.0.2.7:5555")), &proxies());
    assert_eq!(key.to_string(), "192.0.2.7");
}

#[test]
fn trusted_proxy_without_header_keys_on_proxy() {
    let key = ClientKey::from_parts(&parts(Some("  "), Some("10.0.0.1:443")), &proxies());
    assert_eq!(key.as_str(), "10.0.0.1");
}

#[test]
fn client_key_without_connect_info_is_unknown() {
    assert_eq!(ClientKey::from_parts(&parts(Some("203.0.113.9"), None), &proxies()).as_str(), "unknown");
}
