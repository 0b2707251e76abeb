//! Catalog: static sample compositions.
//!
//! DESIGN
//! ======
//! Records are compiled in (see `data.rs`) and never mutated at runtime.
//! `Catalog` wraps them with the lookups the site needs: slug routing,
//! genre filtering, and case-insensitive text search over title and artist.
//! Slug uniqueness is checked once at construction.

mod data;
pub mod license;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate slug: {0}")]
    DuplicateSlug(String),

    #[error("unknown genre: {0}")]
    UnknownGenre(String),
}

impl ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateSlug(_) => "E_DUPLICATE_SLUG",
            Self::UnknownGenre(_) => "E_UNKNOWN_GENRE",
        }
    }
}

// =============================================================================
// GENRE
// =============================================================================

/// Closed set of genres used for grouping and icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Sertanejo,
    Gospel,
    Trap,
    Piseiro,
    Arrocha,
    Funk,
}

impl Genre {
    pub const ALL: [Genre; 6] = [Self::Sertanejo, Self::Gospel, Self::Trap, Self::Piseiro, Self::Arrocha, Self::Funk];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sertanejo => "Sertanejo",
            Self::Gospel => "Gospel",
            Self::Trap => "Trap",
            Self::Piseiro => "Piseiro",
            Self::Arrocha => "Arrocha",
            Self::Funk => "Funk",
        }
    }

    #[must_use]
    pub fn icon(self) -> GenreIcon {
        match self {
            Self::Sertanejo => GenreIcon::CowboyHat,
            Self::Gospel => GenreIcon::Cross,
            Self::Trap => GenreIcon::DollarSign,
            Self::Piseiro => GenreIcon::Boot,
            Self::Arrocha => GenreIcon::Heart,
            Self::Funk => GenreIcon::Music,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = CatalogError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError::UnknownGenre(trimmed.to_owned()))
    }
}

/// Display icon for a genre badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenreIcon {
    CowboyHat,
    Cross,
    DollarSign,
    Boot,
    Heart,
    Music,
}

// =============================================================================
// RECORDS
// =============================================================================

/// A static sample song record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub id: &'static str,
    pub slug: &'static str,
    pub title: &'static str,
    pub artist: &'static str,
    pub genre: Genre,
    pub mood: &'static str,
    pub image_id: &'static str,
    pub lyrics: &'static str,
}

/// Placeholder image metadata referenced by `Composition::image_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub id: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
    pub image_hint: &'static str,
}

/// Combined catalog filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub genre: Option<Genre>,
    pub q: Option<String>,
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<Composition>,
    images: &'static [ImageRef],
}

impl Catalog {
    /// Build a catalog over `records`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateSlug`] if two records share a slug.
    pub fn new(records: Vec<Composition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.slug) {
                return Err(CatalogError::DuplicateSlug(record.slug.to_owned()));
            }
        }
        Ok(Self { records, images: data::PLACEHOLDER_IMAGES })
    }

    /// The compiled-in sample catalog.
    ///
    /// # Errors
    ///
    /// Fails only if the compiled-in data carries a duplicate slug.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(data::COMPOSITIONS.to_vec())
    }

    #[must_use]
    pub fn all(&self) -> &[Composition] {
        &self.records
    }

    /// Every routable slug, in catalog order.
    #[must_use]
    pub fn slugs(&self) -> Vec<&'static str> {
        self.all().iter().map(|c| c.slug).collect()
    }

    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Composition> {
        self.records.iter().find(|c| c.slug == slug)
    }

    #[must_use]
    pub fn by_genre(&self, genre: Genre) -> Vec<&Composition> {
        self.records.iter().filter(|c| c.genre == genre).collect()
    }

    /// Case-insensitive substring match on title and artist. A blank query
    /// matches every record.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&Composition> {
        let needle = text.trim().to_lowercase();
        self.records
            .iter()
            .filter(|c| matches_text(c, &needle))
            .collect()
    }

    /// Text search narrowed to the requested genre, in catalog order.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Composition> {
        let hits = self.search(query.q.as_deref().unwrap_or_default());
        match query.genre {
            Some(genre) => hits.into_iter().filter(|c| c.genre == genre).collect(),
            None => hits,
        }
    }

    #[must_use]
    pub fn image_for(&self, composition: &Composition) -> Option<&ImageRef> {
        self.image(composition.image_id)
    }

    #[must_use]
    pub fn image(&self, id: &str) -> Option<&ImageRef> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Record count per genre, in [`Genre::ALL`] order.
    #[must_use]
    pub fn genre_counts(&self) -> Vec<(Genre, usize)> {
        Genre::ALL
            .into_iter()
            .map(|g| (g, self.by_genre(g).len()))
            .collect()
    }
}

/// `needle` must already be lower-cased.
fn matches_text(composition: &Composition, needle: &str) -> bool {
    needle.is_empty()
        || composition.title.to_lowercase().contains(needle)
        || composition.artist.to_lowercase().contains(needle)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
