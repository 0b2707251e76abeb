//! Schema-checked generation flows.
//!
//! DESIGN
//! ======
//! A [`Flow`] is one request/response round trip to the LLM: a system
//! prompt, a rendered user prompt, and an output tool whose input schema is
//! the expected output record. The model is forced to call that tool; its
//! arguments are decoded into `Flow::Output` and checked by the flow.
//!
//! There is no retry and no fallback. A failed call surfaces as a
//! [`GenerationError`] and the caller decides what to show.

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, ChatResponse, LlmError, Message, Tool};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generative-text call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model returned no structured output")]
    MissingOutput { tokens: u64 },

    #[error("model output does not match the expected shape: {detail}")]
    InvalidOutput { detail: String, tokens: u64 },

    #[error("model returned an empty {field}")]
    EmptyOutput { field: &'static str, tokens: u64 },
}

impl GenerationError {
    /// Tokens the upstream call consumed before the output was rejected.
    #[must_use]
    pub fn tokens(&self) -> u64 {
        match self {
            Self::Llm(_) => 0,
            Self::MissingOutput { tokens } | Self::InvalidOutput { tokens, .. } | Self::EmptyOutput { tokens, .. } => {
                *tokens
            }
        }
    }

    fn with_tokens(mut self, spent: u64) -> Self {
        match &mut self {
            Self::Llm(_) => {}
            Self::MissingOutput { tokens } | Self::InvalidOutput { tokens, .. } | Self::EmptyOutput { tokens, .. } => {
                *tokens = spent;
            }
        }
        self
    }
}

impl ErrorCode for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Llm(_) => "E_LLM_ERROR",
            Self::MissingOutput { .. } => "E_MISSING_OUTPUT",
            Self::InvalidOutput { .. } => "E_INVALID_OUTPUT",
            Self::EmptyOutput { .. } => "E_EMPTY_OUTPUT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

// =============================================================================
// FLOW
// =============================================================================

pub trait Flow {
    type Input: Sync;
    type Output: DeserializeOwned;

    /// Flow name, used in logs.
    const NAME: &'static str;

    fn system_prompt() -> &'static str;

    fn output_tool() -> Tool;

    fn render_prompt(input: &Self::Input) -> String;

    /// Normalize and check a decoded output record.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::EmptyOutput`] (or another variant) when the
    /// record does not satisfy the flow's shape. Token counts are filled in
    /// by [`run_flow`].
    fn finish(output: Self::Output) -> Result<Self::Output, GenerationError>;
}

/// A validated flow output with the token usage it cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutput<T> {
    pub output: T,
    pub tokens: u64,
}

/// Run `F` once against `llm`.
///
/// # Errors
///
/// Returns a [`GenerationError`] if the call fails or the output does not
/// match the flow's declared shape.
pub async fn run_flow<F: Flow>(
    llm: &dyn LlmChat,
    input: &F::Input,
    max_tokens: u32,
) -> Result<FlowOutput<F::Output>, GenerationError> {
    let tools = [F::output_tool()];
    let tool_name = tools[0].name.clone();
    let messages = [Message::user(F::render_prompt(input))];
    let request = ChatRequest {
        max_tokens,
        system: F::system_prompt(),
        messages: &messages,
        tools: &tools,
        force_tool: Some(tool_name.as_str()),
    };

    let response = llm.chat(&request).await?;
    let tokens = response.total_tokens();
    let output = decode_output::<F>(&response, &tool_name).map_err(|e| e.with_tokens(tokens))?;

    info!(flow = F::NAME, model = %response.model, tokens, "generation: flow completed");
    Ok(FlowOutput { output, tokens })
}

fn decode_output<F: Flow>(response: &ChatResponse, tool: &str) -> Result<F::Output, GenerationError> {
    let value = extract_output(response, tool)?;
    let output: F::Output = serde_json::from_value(value)
        .map_err(|e| GenerationError::InvalidOutput { detail: e.to_string(), tokens: 0 })?;
    F::finish(output)
}

/// Pull the structured answer out of a response: the forced tool call when
/// present, otherwise a JSON object in the text (bare or fenced).
fn extract_output(response: &ChatResponse, tool: &str) -> Result<serde_json::Value, GenerationError> {
    if let Some(input) = response.tool_input(tool) {
        return Ok(input.clone());
    }
    let text = response.text();
    json_object_in_text(&text).ok_or(GenerationError::MissingOutput { tokens: 0 })
}

fn json_object_in_text(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&text[start..=end])
        .ok()
        .filter(serde_json::Value::is_object)
}

/// Trim a required string field, rejecting blank values.
///
/// # Errors
///
/// Returns [`GenerationError::EmptyOutput`] naming `field` when blank.
pub fn require_text(value: String, field: &'static str) -> Result<String, GenerationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyOutput { field, tokens: 0 });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;
