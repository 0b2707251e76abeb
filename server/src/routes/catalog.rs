//! Catalog routes: genres, compositions, slugs and the mock license quote.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::catalog::license::{LicenseQuote, license_quote};
use crate::catalog::{CatalogQuery, Composition, Genre, GenreIcon, ImageRef};
use crate::error::ApiError;
use crate::site::{GenreBadge, genre_strip};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompositionsParams {
    pub genre: Option<String>,
    pub q: Option<String>,
}

impl CompositionsParams {
    fn into_query(self) -> Result<CatalogQuery, ApiError> {
        let genre = match self.genre.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Genre>().map_err(|e| ApiError::BadRequest(e.to_string()))?),
        };
        Ok(CatalogQuery { genre, q: self.q })
    }
}

/// A composition with its resolved icon and image.
#[derive(Debug, Serialize)]
pub struct CompositionDetail {
    #[serde(flatten)]
    pub composition: Composition,
    pub icon: GenreIcon,
    pub image: Option<ImageRef>,
}

fn find(state: &AppState, slug: &str) -> Result<Composition, ApiError> {
    state
        .catalog
        .find_by_slug(slug)
        .copied()
        .ok_or_else(|| ApiError::NotFound(format!("composition `{slug}`")))
}

/// `GET /api/genres`: every genre with its icon and record count.
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<GenreBadge>> {
    Json(genre_strip(&state.catalog))
}

/// `GET /api/compositions?genre=&q=`: filtered list in catalog order.
pub async fn list_compositions(
    State(state): State<AppState>,
    Query(params): Query<CompositionsParams>,
) -> Result<Json<Vec<Composition>>, ApiError> {
    let query = params.into_query()?;
    Ok(Json(state.catalog.query(&query).into_iter().copied().collect()))
}

/// `GET /api/compositions/{slug}`
pub async fn get_composition(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CompositionDetail>, ApiError> {
    let composition = find(&state, &slug)?;
    let image = state.catalog.image_for(&composition).copied();
    Ok(Json(CompositionDetail { composition, icon: composition.genre.icon(), image }))
}

/// `GET /api/compositions/{slug}/license`: static purchase terms.
pub async fn get_license(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LicenseQuote>, ApiError> {
    let composition = find(&state, &slug)?;
    Ok(Json(license_quote(&composition)))
}

/// `GET /api/slugs`: every routable composition slug.
pub async fn list_slugs(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.catalog.slugs())
}
