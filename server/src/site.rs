//! Landing-page structure.
//!
//! Describes what the site is made of (navigation, genre strip, survey
//! calls to action, legal links) so a front end can render it. The copy
//! itself lives with the front end.

use serde::Serialize;

use crate::catalog::{Catalog, Genre, GenreIcon};
use crate::config::ServerConfig;
use crate::services::survey::Audience;

pub const SITE_NAME: &str = "SONGNATION";
pub const DOCUMENT_TITLE: &str = "SongRise - Market Research";
pub const DOCUMENT_DESCRIPTION: &str = "Help us build the future of music IP.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub name: &'static str,
    pub metadata: Metadata,
    pub nav: Vec<NavItem>,
    pub genres: Vec<GenreBadge>,
    pub surveys: Vec<SurveyCta>,
    pub legal: LegalLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// One genre in the genre strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreBadge {
    pub genre: Genre,
    pub icon: GenreIcon,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyCta {
    pub audience: Audience,
    pub respondent: &'static str,
    pub form_url: String,
    /// API endpoint accepting a structured submission.
    pub submit_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalLinks {
    pub terms: &'static str,
    pub privacy: &'static str,
}

const NAV: [NavItem; 3] = [
    NavItem { href: "/", label: "Discover", icon: "compass" },
    NavItem { href: "/lyric-generator", label: "Lyric Generator", icon: "mic-vocal" },
    NavItem { href: "/seo-optimizer", label: "SEO Optimizer", icon: "search-check" },
];

#[must_use]
pub fn genre_strip(catalog: &Catalog) -> Vec<GenreBadge> {
    catalog
        .genre_counts()
        .into_iter()
        .map(|(genre, count)| GenreBadge { genre, icon: genre.icon(), count })
        .collect()
}

#[must_use]
pub fn survey_ctas(config: &ServerConfig) -> Vec<SurveyCta> {
    Audience::ALL
        .into_iter()
        .map(|audience| SurveyCta {
            audience,
            respondent: audience.respondent(),
            form_url: match audience {
                Audience::Creator => config.creator_form_url.clone(),
                Audience::Buyer => config.buyer_form_url.clone(),
            },
            submit_path: format!("/api/surveys/{audience}"),
        })
        .collect()
}

#[must_use]
pub fn site_info(catalog: &Catalog, config: &ServerConfig) -> SiteInfo {
    SiteInfo {
        name: SITE_NAME,
        metadata: Metadata { title: DOCUMENT_TITLE, description: DOCUMENT_DESCRIPTION },
        nav: NAV.to_vec(),
        genres: genre_strip(catalog),
        surveys: survey_ctas(config),
        legal: LegalLinks { terms: "/terms", privacy: "/privacy" },
    }
}
