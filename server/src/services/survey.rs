//! Market-research survey intake.
//!
//! DESIGN
//! ======
//! Submissions are validated and logged, never stored. The receipt id only
//! correlates the log line with the response the respondent saw.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::Genre;
use crate::error::FieldError;

pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_COMMENTS_CHARS: usize = 2000;
const MAX_EMAIL_CHARS: usize = 254;

// =============================================================================
// AUDIENCE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Composers and producers.
    Creator,
    /// Artists and performers.
    Buyer,
}

impl Audience {
    pub const ALL: [Self; 2] = [Self::Creator, Self::Buyer];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Buyer => "buyer",
        }
    }

    /// Who the survey is for, as shown on its call-to-action button.
    #[must_use]
    pub fn respondent(self) -> &'static str {
        match self {
            Self::Creator => "Composer / Producer",
            Self::Buyer => "Artist / Performer",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown survey audience: {0}")]
pub struct UnknownAudience(pub String);

impl FromStr for Audience {
    type Err = UnknownAudience;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creator" => Ok(Self::Creator),
            "buyer" => Ok(Self::Buyer),
            _ => Err(UnknownAudience(s.to_string())),
        }
    }
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Price a respondent would pay (or ask) for an exclusive license, in BRL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceBand {
    #[serde(rename = "up_to_1k")]
    UpTo1k,
    #[serde(rename = "from_1k_to_5k")]
    From1kTo5k,
    #[serde(rename = "from_5k_to_20k")]
    From5kTo20k,
    #[serde(rename = "above_20k")]
    Above20k,
}

impl PriceBand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpTo1k => "up_to_1k",
            Self::From1kTo5k => "from_1k_to_5k",
            Self::From5kTo20k => "from_5k_to_20k",
            Self::Above20k => "above_20k",
        }
    }
}

/// Raw survey body as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurveySubmission {
    pub email: String,
    pub name: Option<String>,
    pub genres: Vec<String>,
    pub interest: Option<i64>,
    pub price_band: Option<PriceBand>,
    pub comments: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyResponse {
    pub email: String,
    pub name: Option<String>,
    pub genres: Vec<Genre>,
    pub interest: u8,
    pub price_band: Option<PriceBand>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyReceipt {
    pub id: Uuid,
    pub audience: Audience,
}

impl SurveySubmission {
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failed field.
    pub fn validate(&self) -> Result<SurveyResponse, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = self.email.trim();
        if !looks_like_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email address."));
        }

        let name = optional_text(self.name.as_deref());
        if name.as_ref().is_some_and(|n| n.chars().count() > MAX_NAME_CHARS) {
            errors.push(FieldError::new("name", format!("Name must be at most {MAX_NAME_CHARS} characters.")));
        }

        let mut genres = Vec::new();
        let mut unknown = false;
        for label in &self.genres {
            match label.parse::<Genre>() {
                Ok(genre) if !genres.contains(&genre) => genres.push(genre),
                Ok(_) => {}
                Err(_) => unknown = true,
            }
        }
        if unknown {
            errors.push(FieldError::new("genres", "Unknown genre selected."));
        } else if genres.is_empty() {
            errors.push(FieldError::new("genres", "Please select at least one genre."));
        }

        let interest = self.interest.and_then(|v| u8::try_from(v).ok()).filter(|v| (1..=5).contains(v));
        if interest.is_none() {
            errors.push(FieldError::new("interest", "Interest must be between 1 and 5."));
        }

        let comments = optional_text(self.comments.as_deref());
        if comments.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENTS_CHARS) {
            errors.push(FieldError::new(
                "comments",
                format!("Comments must be at most {MAX_COMMENTS_CHARS} characters."),
            ));
        }

        match interest {
            Some(interest) if errors.is_empty() => Ok(SurveyResponse {
                email: email.to_string(),
                name,
                genres,
                interest,
                price_band: self.price_band,
                comments,
            }),
            _ => Err(errors),
        }
    }
}

/// Log a validated response. Nothing is persisted.
#[must_use]
pub fn record(audience: Audience, response: &SurveyResponse) -> SurveyReceipt {
    let receipt = SurveyReceipt { id: Uuid::new_v4(), audience };
    let genres = response.genres.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(",");
    info!(
        id = %receipt.id,
        %audience,
        email = %response.email,
        name = response.name.as_deref().unwrap_or(""),
        genres = %genres,
        interest = response.interest,
        price_band = response.price_band.map_or("", PriceBand::as_str),
        comments = response.comments.as_deref().unwrap_or(""),
        "survey: submission received"
    );
    receipt
}

// =============================================================================
// HELPERS
// =============================================================================

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `local@domain.tld` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_CHARS || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

#[cfg(test)]
#[path = "survey_test.rs"]
mod tests;
