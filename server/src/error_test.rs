use super::*;
use crate::llm::types::LlmError;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn status_mapping() {
    assert_eq!(ApiError::Validation(Vec::new()).status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::Generation(GenerationError::MissingOutput { tokens: 0 }).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        ApiError::RateLimited(RateLimitError::GlobalExceeded { limit: 1, window_secs: 60 }).status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(ApiError::LlmNotConfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ApiError::StoreNotConfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn generation_errors_keep_their_own_code() {
    let err = ApiError::from(GenerationError::EmptyOutput { field: "snippet", tokens: 0 });
    assert_eq!(err.error_code(), "E_EMPTY_OUTPUT");
    assert!(!err.retryable());

    let err = ApiError::from(GenerationError::Llm(LlmError::ApiResponse { status: 429, body: String::new() }));
    assert_eq!(err.error_code(), "E_LLM_ERROR");
    assert!(err.retryable());
}

#[tokio::test]
async fn validation_response_lists_fields() {
    let err = ApiError::Validation(vec![FieldError::new("style", "Style must be at least 3 characters.")]);
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({
            "error": {
                "code": "E_VALIDATION",
                "message": "validation failed",
                "retryable": false,
                "fields": [{ "field": "style", "message": "Style must be at least 3 characters." }],
            }
        })
    );
}

#[tokio::test]
async fn other_errors_omit_fields() {
    let body = body_json(ApiError::NotFound("composition `x`".into()).into_response()).await;
    assert_eq!(body["error"]["message"], "composition `x` not found");
    assert!(body["error"].get("fields").is_none());
}

#[tokio::test]
async fn rate_limited_is_retryable() {
    let err = ApiError::from(RateLimitError::PerClientExceeded { limit: 10, window_secs: 60 });
    let body = body_json(err.into_response()).await;
    assert_eq!(body["error"]["code"], "E_RATE_LIMITED");
    assert_eq!(body["error"]["retryable"], true);
}
