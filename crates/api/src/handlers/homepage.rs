//! Homepage curation.

use std::collections::{HashMap, HashSet};

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::locale::pick;
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::homepage::FeaturedMovie;
use lao_cinema_db::models::movie::MovieTranslation;
use lao_cinema_db::repositories::{HomepageRepo, MovieRepo};
use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::query::LangParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on the number of featured slots.
const MAX_FEATURED: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub movie_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct FeaturedEntry {
    #[serde(flatten)]
    pub featured: FeaturedMovie,
    pub title: Option<String>,
}

fn validate_featured(ids: &[DbId]) -> AppResult<()> {
    if ids.len() > MAX_FEATURED {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_FEATURED} featured movies are allowed"
        ))));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Movie {dup} is listed more than once"
        ))));
    }
    Ok(())
}

async fn with_titles(
    state: &AppState,
    featured: Vec<FeaturedMovie>,
    lang: lao_cinema_core::locale::Language,
) -> AppResult<Vec<FeaturedEntry>> {
    let ids: Vec<DbId> = featured.iter().map(|f| f.movie_id).collect();
    let mut by_movie: HashMap<DbId, Vec<MovieTranslation>> = HashMap::new();
    for t in MovieRepo::translations_for(&state.pool, &ids).await? {
        by_movie.entry(t.movie_id).or_default().push(t);
    }
    Ok(featured
        .into_iter()
        .map(|featured| {
            let title = by_movie
                .get(&featured.movie_id)
                .and_then(|ts| pick(ts, lang))
                .map(|t| t.title.clone());
            FeaturedEntry { featured, title }
        })
        .collect())
}

/// GET /api/v1/homepage/featured
///
/// Published movies only, in curated order.
pub async fn get_featured(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<Vec<FeaturedEntry>>>> {
    let lang = lang.resolve(&headers)?;
    let featured = HomepageRepo::list_featured(&state.pool, true).await?;
    Ok(Json(DataResponse {
        data: with_titles(&state, featured, lang).await?,
    }))
}

/// PUT /api/v1/homepage/featured
///
/// Replaces the whole list. Returns every slot, drafts included, so the
/// editor sees what was stored.
pub async fn set_featured(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    headers: HeaderMap,
    Query(lang): Query<LangParams>,
    Json(input): Json<SetFeaturedRequest>,
) -> AppResult<Json<DataResponse<Vec<FeaturedEntry>>>> {
    let lang = lang.resolve(&headers)?;
    validate_featured(&input.movie_ids)?;

    HomepageRepo::replace_featured(&state.pool, &input.movie_ids).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::HOMEPAGE_UPDATE)
            .by(Some(user.user_id))
            .details(serde_json::json!({ "movie_ids": input.movie_ids }))
            .entity_type(entity_types::HOMEPAGE),
    )
    .await;

    let featured = HomepageRepo::list_featured(&state.pool, false).await?;
    Ok(Json(DataResponse {
        data: with_titles(&state, featured, lang).await?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected() {
        assert!(validate_featured(&[1, 2, 3]).is_ok());
        assert!(validate_featured(&[]).is_ok());
        assert!(validate_featured(&[4, 5, 4]).is_err());
    }

    #[test]
    fn list_length_is_capped() {
        let ids: Vec<DbId> = (1..=MAX_FEATURED as DbId + 1).collect();
        assert!(validate_featured(&ids).is_err());
        assert!(validate_featured(&ids[..MAX_FEATURED]).is_ok());
    }
}
