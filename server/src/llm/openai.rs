//! OpenAI-compatible Chat Completions client.
//!
//! Talks to `{base_url}/chat/completions`, so any OpenAI-compatible gateway
//! works. Tool calls come back as JSON-encoded argument strings and are
//! decoded into [`ContentBlock::ToolUse`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{ChatRequest, ChatResponse, ContentBlock, LlmError, Tool};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: &str, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// # Errors
    ///
    /// Returns an [`LlmError`] on transport failure, non-200 status or an
    /// unparseable body.
    pub async fn chat(&self, model: &str, request: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let body = build_request(model, request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// REQUEST WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<CcMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<CcToolDef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<CcToolChoice<'a>>,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CcToolDef<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: CcFunctionDef<'a>,
}

#[derive(Serialize)]
struct CcFunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Serialize)]
struct CcToolChoice<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: CcNamedFunction<'a>,
}

#[derive(Serialize)]
struct CcNamedFunction<'a> {
    name: &'a str,
}

impl<'a> From<&'a Tool> for CcToolDef<'a> {
    fn from(tool: &'a Tool) -> Self {
        Self {
            tool_type: "function",
            function: CcFunctionDef { name: &tool.name, description: &tool.description, parameters: &tool.input_schema },
        }
    }
}

fn build_request<'a>(model: &'a str, request: &ChatRequest<'a>) -> CcRequest<'a> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.trim().is_empty() {
        messages.push(CcMessage { role: "system", content: request.system });
    }
    messages.extend(
        request
            .messages
            .iter()
            .map(|m| CcMessage { role: &m.role, content: &m.content }),
    );

    CcRequest {
        model,
        max_tokens: request.max_tokens,
        messages,
        tools: request.tools.iter().map(CcToolDef::from).collect(),
        tool_choice: request
            .force_tool
            .map(|name| CcToolChoice { tool_type: "function", function: CcNamedFunction { name } }),
    }
}

// =============================================================================
// RESPONSE WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct CcResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<CcChoice>,
    #[serde(default)]
    usage: CcUsage,
}

#[derive(Deserialize)]
struct CcChoice {
    message: CcResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CcResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<CcToolCall>,
}

#[derive(Deserialize)]
struct CcToolCall {
    id: String,
    function: CcFunctionCall,
}

#[derive(Deserialize)]
struct CcFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize, Default)]
struct CcUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let root: CcResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let Some(choice) = root.choices.into_iter().next() else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };

    let mut content = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }
    for call in choice.message.tool_calls {
        let raw = if call.function.arguments.trim().is_empty() { "{}" } else { call.function.arguments.as_str() };
        let input: Value = serde_json::from_str(raw)
            .map_err(|e| LlmError::ApiParse(format!("chat_completions: tool call arguments: {e}")))?;
        content.push(ContentBlock::ToolUse { id: call.id, name: call.function.name, input });
    }

    let has_tool_use = content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolUse { .. }));
    let stop_reason = if has_tool_use {
        "tool_use"
    } else if choice.finish_reason.as_deref() == Some("length") {
        "max_tokens"
    } else {
        "end_turn"
    };

    Ok(ChatResponse {
        content,
        model: root.model,
        stop_reason: stop_reason.to_string(),
        input_tokens: root.usage.prompt_tokens,
        output_tokens: root.usage.completion_tokens,
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
