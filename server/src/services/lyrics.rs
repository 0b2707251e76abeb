//! Lyric snippet generator.
//!
//! Turns a genre + style/theme into a short lyric snippet in one
//! generative-text call.

use serde::{Deserialize, Serialize};

use super::generation::{self, Flow, FlowOutput, GenerationError};
use crate::catalog::Genre;
use crate::error::FieldError;
use crate::llm::LlmChat;
use crate::llm::tools::{OutputField, output_tool};
use crate::llm::types::Tool;

const MIN_STYLE_CHARS: usize = 3;

/// Raw form body as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LyricSnippetRequest {
    pub genre: String,
    pub style: String,
}

/// Validated flow input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricSnippetInput {
    pub genre: Genre,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricSnippet {
    pub snippet: String,
}

impl LyricSnippetRequest {
    /// # Errors
    ///
    /// Returns every failed field at once.
    pub fn validate(&self) -> Result<LyricSnippetInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let genre = self.genre.parse::<Genre>().ok();
        if genre.is_none() {
            errors.push(FieldError::new("genre", "Please select a genre."));
        }

        let style = self.style.trim();
        if style.chars().count() < MIN_STYLE_CHARS {
            errors.push(FieldError::new("style", "Style must be at least 3 characters."));
        }

        match genre {
            Some(genre) if errors.is_empty() => Ok(LyricSnippetInput { genre, style: style.to_string() }),
            _ => Err(errors),
        }
    }
}

pub struct LyricSnippetFlow;

impl Flow for LyricSnippetFlow {
    type Input = LyricSnippetInput;
    type Output = LyricSnippet;

    const NAME: &'static str = "lyric_snippet";

    fn system_prompt() -> &'static str {
        "You are a songwriter specializing in Brazilian music. \
         Always answer by calling the emit_lyric_snippet tool."
    }

    fn output_tool() -> Tool {
        output_tool(
            "emit_lyric_snippet",
            "Return the generated lyric snippet.",
            &[OutputField { name: "snippet", description: "The generated lyric snippet." }],
        )
    }

    fn render_prompt(input: &LyricSnippetInput) -> String {
        format!(
            "Generate a short lyric snippet based on the provided genre and style.\n\n\
             Genre: {}\nStyle: {}\n\nLyric Snippet:",
            input.genre, input.style
        )
    }

    fn finish(output: LyricSnippet) -> Result<LyricSnippet, GenerationError> {
        Ok(LyricSnippet { snippet: generation::require_text(output.snippet, "snippet")? })
    }
}

/// # Errors
///
/// See [`generation::run_flow`].
pub async fn generate_lyric_snippet(
    llm: &dyn LlmChat,
    input: &LyricSnippetInput,
    max_tokens: u32,
) -> Result<FlowOutput<LyricSnippet>, GenerationError> {
    generation::run_flow::<LyricSnippetFlow>(llm, input, max_tokens).await
}

#[cfg(test)]
#[path = "lyrics_test.rs"]
mod tests;
