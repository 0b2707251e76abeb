//! SEO keyword generator.

use serde::{Deserialize, Serialize};

use super::generation::{self, Flow, FlowOutput, GenerationError};
use crate::catalog::Genre;
use crate::error::FieldError;
use crate::llm::LlmChat;
use crate::llm::tools::{OutputField, output_tool};
use crate::llm::types::Tool;

const MIN_TITLE_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeoKeywordsRequest {
    pub title: String,
    pub genre: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoKeywordsInput {
    pub title: String,
    pub genre: Genre,
    pub description: String,
}

/// `keywords` is a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoKeywords {
    pub keywords: String,
}

impl SeoKeywords {
    #[must_use]
    pub fn keyword_list(&self) -> Vec<String> {
        split_keywords(&self.keywords)
    }
}

impl SeoKeywordsRequest {
    /// # Errors
    ///
    /// Returns every failed field at once.
    pub fn validate(&self) -> Result<SeoKeywordsInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.chars().count() < MIN_TITLE_CHARS {
            errors.push(FieldError::new("title", "Title must be at least 3 characters."));
        }

        let genre = self.genre.parse::<Genre>().ok();
        if genre.is_none() {
            errors.push(FieldError::new("genre", "Please select a genre."));
        }

        let description = self.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            errors.push(FieldError::new("description", "Description must be at least 10 characters."));
        }

        match genre {
            Some(genre) if errors.is_empty() => Ok(SeoKeywordsInput {
                title: title.to_string(),
                genre,
                description: description.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

pub struct SeoKeywordsFlow;

impl Flow for SeoKeywordsFlow {
    type Input = SeoKeywordsInput;
    type Output = SeoKeywords;

    const NAME: &'static str = "seo_keywords";

    fn system_prompt() -> &'static str {
        "You are an SEO expert specializing in music. \
         Always answer by calling the emit_seo_keywords tool."
    }

    fn output_tool() -> Tool {
        output_tool(
            "emit_seo_keywords",
            "Return the suggested SEO keywords.",
            &[OutputField { name: "keywords", description: "Comma-separated list of SEO keywords." }],
        )
    }

    fn render_prompt(input: &SeoKeywordsInput) -> String {
        format!(
            "Generate a list of comma-separated keywords for a song based on its title, genre, and description.\n\n\
             Title: {}\nGenre: {}\nDescription: {}\n\nKeywords:",
            input.title, input.genre, input.description
        )
    }

    fn finish(output: SeoKeywords) -> Result<SeoKeywords, GenerationError> {
        let list = split_keywords(&output.keywords);
        if list.is_empty() {
            return Err(GenerationError::EmptyOutput { field: "keywords", tokens: 0 });
        }
        Ok(SeoKeywords { keywords: list.join(", ") })
    }
}

/// Split on `,`, trimming and dropping empty entries. Order is kept.
#[must_use]
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string).collect()
}

/// # Errors
///
/// See [`generation::run_flow`].
pub async fn generate_seo_keywords(
    llm: &dyn LlmChat,
    input: &SeoKeywordsInput,
    max_tokens: u32,
) -> Result<FlowOutput<SeoKeywords>, GenerationError> {
    generation::run_flow::<SeoKeywordsFlow>(llm, input, max_tokens).await
}

#[cfg(test)]
#[path = "seo_test.rs"]
mod tests;
