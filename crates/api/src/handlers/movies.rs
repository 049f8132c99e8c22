//! Handlers for the `/movies` resource and its sub-resources (translations,
//! genres, production companies, images, awards).
//!
//! Reads are public but only expose published movies unless the caller is an
//! editor or admin. Every mutation requires [`RequireEditor`] and writes an
//! audit entry.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lao_cinema_core::audit::{action_types, diff_fields, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::locale::{pick, Language};
use lao_cinema_core::stream_token::media_dir;
use lao_cinema_core::types::{Cents, DbId};
use lao_cinema_core::validation::{
    image_kind, movie_status, validate_currency, validate_media_path, validate_movie_video_path,
    validate_one_of, validate_price_cents, validate_runtime, validate_slug, validate_title,
};
use lao_cinema_db::models::award::MovieAward;
use lao_cinema_db::models::genre::Genre;
use lao_cinema_db::models::movie::{
    CreateMovie, CreateMovieImage, Movie, MovieFilter, MovieImage, MovieTranslation, UpdateMovie,
    UpsertMovieTranslation,
};
use lao_cinema_db::models::production_company::ProductionCompany;
use lao_cinema_db::models::trailer::Trailer;
use lao_cinema_db::repositories::{AwardRepo, MovieRepo, TrailerRepo};
use serde::{Deserialize, Serialize};

use super::credits::{load_credits, CastEntry, CrewEntry};
use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::middleware::viewer::Viewer;
use crate::query::{LangParams, PaginationParams};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MovieListParams {
    /// Honoured for editors only; everyone else sees published movies.
    pub status: Option<String>,
    pub genre_id: Option<DbId>,
    /// Case-insensitive title search.
    pub q: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Localised text chosen for display.
#[derive(Debug, Serialize)]
pub struct DisplayText {
    /// Language the text actually came from after fallback.
    pub language: Option<String>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
}

impl DisplayText {
    fn pick(movie: &Movie, translations: &[MovieTranslation], lang: Language) -> Self {
        match pick(translations, lang) {
            Some(t) => DisplayText {
                language: Some(t.language.clone()),
                title: Some(t.title.clone()),
                overview: t.overview.clone(),
                tagline: t.tagline.clone(),
            },
            None => DisplayText {
                language: None,
                title: movie.original_title.clone(),
                overview: None,
                tagline: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListItem {
    #[serde(flatten)]
    pub movie: Movie,
    pub display: DisplayText,
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub display: DisplayText,
    pub has_video: bool,
    pub translations: Vec<MovieTranslation>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
    pub images: Vec<MovieImage>,
    pub cast: Vec<CastEntry>,
    pub crew: Vec<CrewEntry>,
    pub trailers: Vec<Trailer>,
}

#[derive(Debug, Deserialize)]
pub struct SetGenresRequest {
    pub genre_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct SetCompaniesRequest {
    pub company_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a movie the viewer is allowed to see. Drafts and archived movies
/// are reported as missing to non-editors.
pub(crate) async fn load_visible_movie(
    state: &AppState,
    viewer: &Viewer,
    id: DbId,
) -> AppResult<Movie> {
    MovieRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|m| m.is_published() || viewer.can_edit())
        .ok_or_else(|| not_found("Movie", id))
}

async fn ensure_movie_exists(state: &AppState, id: DbId) -> AppResult<Movie> {
    MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Movie", id))
}

fn validate_movie_fields(
    slug: Option<&str>,
    status: Option<&str>,
    original_language: Option<&str>,
    runtime_minutes: Option<i32>,
    rental_price_cents: Option<Cents>,
    currency: Option<&str>,
    video_path: Option<&str>,
) -> AppResult<()> {
    if let Some(slug) = slug {
        validate_slug(slug)?;
    }
    if let Some(status) = status {
        validate_one_of("status", status, movie_status::ALL)?;
    }
    if let Some(lang) = original_language {
        if lang.trim().is_empty() || lang.len() > 8 {
            return Err(AppError::BadRequest(
                "original_language must be a short language code".into(),
            ));
        }
    }
    validate_runtime(runtime_minutes)?;
    validate_price_cents(rental_price_cents)?;
    if let Some(currency) = currency {
        validate_currency(currency)?;
    }
    if let Some(path) = video_path {
        validate_movie_video_path(path)?;
    }
    Ok(())
}

/// A video token unlocks the whole directory of the movie's video, so no two
/// movies may share (or nest) media directories.
async fn ensure_media_dir_free(
    state: &AppState,
    video_path: Option<&str>,
    movie_id: Option<DbId>,
) -> AppResult<()> {
    let Some(dir) = video_path.and_then(media_dir) else {
        return Ok(());
    };
    if let Some(owner) = MovieRepo::media_dir_owner(&state.pool, &dir, movie_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Media directory '{dir}' overlaps the media of movie {owner}"
        ))));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Movie CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/movies
pub async fn list_movies(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Query(params): Query<MovieListParams>,
) -> AppResult<Json<DataResponse<Page<MovieListItem>>>> {
    let lang = LangParams {
        lang: params.lang.clone(),
    }
    .resolve(&headers)?;

    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let status = if viewer.can_edit() {
        if let Some(status) = params.status.as_deref() {
            validate_one_of("status", status, movie_status::ALL)?;
        }
        params.status.clone()
    } else {
        Some(movie_status::PUBLISHED.to_string())
    };

    let filter = MovieFilter {
        status,
        genre_id: params.genre_id,
        search: params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        limit: page.limit(),
        offset: page.offset(),
    };

    let movies = MovieRepo::list(&state.pool, &filter).await?;
    let total = MovieRepo::count(&state.pool, &filter).await?;

    let ids: Vec<DbId> = movies.iter().map(|m| m.id).collect();
    let mut by_movie: HashMap<DbId, Vec<MovieTranslation>> = HashMap::new();
    for t in MovieRepo::translations_for(&state.pool, &ids).await? {
        by_movie.entry(t.movie_id).or_default().push(t);
    }

    let items = movies
        .into_iter()
        .map(|movie| {
            let translations = by_movie.remove(&movie.id).unwrap_or_default();
            let display = DisplayText::pick(&movie, &translations, lang);
            MovieListItem { movie, display }
        })
        .collect();

    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}

/// GET /api/v1/movies/{id}
pub async fn get_movie(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Path(id): Path<DbId>,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<MovieDetail>>> {
    let lang = lang.resolve(&headers)?;
    let movie = load_visible_movie(&state, &viewer, id).await?;

    let translations = MovieRepo::translations(&state.pool, id).await?;
    let genres = MovieRepo::genres(&state.pool, id).await?;
    let production_companies = MovieRepo::production_companies(&state.pool, id).await?;
    let images = MovieRepo::images(&state.pool, id).await?;
    let (cast, crew) = load_credits(&state, id, lang).await?;
    let trailers = TrailerRepo::list_for_movie(&state.pool, id).await?;

    let display = DisplayText::pick(&movie, &translations, lang);
    Ok(Json(DataResponse {
        data: MovieDetail {
            has_video: movie.has_video(),
            movie,
            display,
            translations,
            genres,
            production_companies,
            images,
            cast,
            crew,
            trailers,
        },
    }))
}

/// POST /api/v1/movies
pub async fn create_movie(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateMovie>,
) -> AppResult<(StatusCode, Json<DataResponse<Movie>>)> {
    validate_movie_fields(
        Some(&input.slug),
        input.status.as_deref(),
        input.original_language.as_deref(),
        input.runtime_minutes,
        input.rental_price_cents,
        input.currency.as_deref(),
        input.video_path.as_deref(),
    )?;
    ensure_media_dir_free(&state, input.video_path.as_deref(), None).await?;

    let movie = MovieRepo::create(&state.pool, &input).await?;
    tracing::info!(movie_id = movie.id, slug = %movie.slug, user_id = user.user_id, "Movie created");

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, movie.id)
            .details(serde_json::json!({ "slug": movie.slug })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: movie })))
}

/// PUT /api/v1/movies/{id}
pub async fn update_movie(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMovie>,
) -> AppResult<Json<DataResponse<Movie>>> {
    validate_movie_fields(
        input.slug.as_deref(),
        input.status.as_deref(),
        input.original_language.as_deref(),
        input.runtime_minutes,
        input.rental_price_cents,
        input.currency.as_deref(),
        input.video_path.as_deref(),
    )?;

    let before = ensure_movie_exists(&state, id).await?;
    ensure_media_dir_free(&state, input.video_path.as_deref(), Some(id)).await?;
    let movie = MovieRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Movie", id))?;

    // video_path is not serialized, so record its change explicitly.
    let mut changes = diff_fields(&to_json(&before), &to_json(&movie));
    if before.video_path != movie.video_path {
        if let Some(map) = changes.as_object_mut() {
            map.insert("video_path_changed".into(), serde_json::Value::Bool(true));
        }
    }

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, id)
            .details(changes),
    )
    .await;

    Ok(Json(DataResponse { data: movie }))
}

/// DELETE /api/v1/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MovieRepo::delete(&state.pool, id).await? {
        return Err(not_found("Movie", id));
    }
    tracing::info!(movie_id = id, user_id = user.user_id, "Movie deleted");

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Translations, genres, companies
// ---------------------------------------------------------------------------

/// PUT /api/v1/movies/{id}/translations/{lang}
pub async fn upsert_translation(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, lang)): Path<(DbId, String)>,
    Json(input): Json<UpsertMovieTranslation>,
) -> AppResult<Json<DataResponse<MovieTranslation>>> {
    let language = Language::parse(&lang)?;
    validate_title(&input.title)?;
    ensure_movie_exists(&state, id).await?;

    let translation =
        MovieRepo::upsert_translation(&state.pool, id, language.code(), &input).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, id)
            .details(serde_json::json!({ "translation": language.code() })),
    )
    .await;

    Ok(Json(DataResponse { data: translation }))
}

/// PUT /api/v1/movies/{id}/genres
///
/// Replace the movie's genre set.
pub async fn set_genres(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<SetGenresRequest>,
) -> AppResult<Json<DataResponse<Vec<Genre>>>> {
    ensure_movie_exists(&state, id).await?;
    MovieRepo::set_genres(&state.pool, id, &input.genre_ids).await?;
    let genres = MovieRepo::genres(&state.pool, id).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, id)
            .details(serde_json::json!({ "genre_ids": input.genre_ids })),
    )
    .await;

    Ok(Json(DataResponse { data: genres }))
}

/// PUT /api/v1/movies/{id}/production-companies
pub async fn set_production_companies(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<SetCompaniesRequest>,
) -> AppResult<Json<DataResponse<Vec<ProductionCompany>>>> {
    ensure_movie_exists(&state, id).await?;
    MovieRepo::set_production_companies(&state.pool, id, &input.company_ids).await?;
    let companies = MovieRepo::production_companies(&state.pool, id).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE, id)
            .details(serde_json::json!({ "company_ids": input.company_ids })),
    )
    .await;

    Ok(Json(DataResponse { data: companies }))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// POST /api/v1/movies/{id}/images
pub async fn add_image(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(mut input): Json<CreateMovieImage>,
) -> AppResult<(StatusCode, Json<DataResponse<MovieImage>>)> {
    validate_one_of("image kind", &input.kind, image_kind::ALL)?;
    validate_media_path(&input.path)?;
    if let Some(lang) = input.language.as_deref() {
        input.language = Some(Language::parse(lang)?.code().to_string());
    }
    ensure_movie_exists(&state, id).await?;

    let image = MovieRepo::add_image(&state.pool, id, &input).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE_IMAGE, image.id)
            .details(serde_json::json!({
                "movie_id": id,
                "kind": image.kind,
                "is_primary": image.is_primary,
            })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// POST /api/v1/movies/{id}/images/{image_id}/primary
///
/// Make the image the primary one of its kind; the previous primary is
/// demoted in the same transaction.
pub async fn set_primary_image(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<MovieImage>>> {
    let image = MovieRepo::set_primary_image(&state.pool, id, image_id)
        .await?
        .ok_or_else(|| not_found("MovieImage", image_id))?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE_IMAGE, image_id)
            .details(serde_json::json!({ "movie_id": id, "is_primary": true })),
    )
    .await;

    Ok(Json(DataResponse { data: image }))
}

/// DELETE /api/v1/movies/{id}/images/{image_id}
pub async fn delete_image(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !MovieRepo::delete_image(&state.pool, id, image_id).await? {
        return Err(not_found("MovieImage", image_id));
    }

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::MOVIE_IMAGE, image_id)
            .details(serde_json::json!({ "movie_id": id })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Awards
// ---------------------------------------------------------------------------

/// GET /api/v1/movies/{id}/awards
pub async fn movie_awards(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MovieAward>>>> {
    load_visible_movie(&state, &viewer, id).await?;
    let awards = AwardRepo::for_movie(&state.pool, id).await?;
    Ok(Json(DataResponse { data: awards }))
}
