//! Trailers under `/movies/{id}/trailers`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::locale::Language;
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::{trailer_kind, validate_media_path};
use lao_cinema_db::models::trailer::{CreateTrailer, Trailer};
use lao_cinema_db::repositories::{MovieRepo, TrailerRepo};

use super::movies::load_visible_movie;
use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::middleware::viewer::Viewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// YouTube video ids are 11 URL-safe base64 characters.
fn is_youtube_key(key: &str) -> bool {
    key.len() == 11
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A YouTube trailer needs a key and no file; a hosted one the reverse.
fn validate_trailer(input: &mut CreateTrailer) -> AppResult<()> {
    let invalid = |msg: &str| AppError::Core(CoreError::Validation(msg.into()));
    match input.kind.as_str() {
        trailer_kind::YOUTUBE => {
            let key = input.youtube_key.as_deref().map(str::trim).unwrap_or("");
            if !is_youtube_key(key) {
                return Err(invalid("youtube trailers need an 11 character youtube_key"));
            }
            if input.video_path.is_some() {
                return Err(invalid("youtube trailers must not set video_path"));
            }
            input.youtube_key = Some(key.to_string());
        }
        trailer_kind::HOSTED => {
            let path = input
                .video_path
                .as_deref()
                .ok_or_else(|| invalid("hosted trailers need a video_path"))?;
            validate_media_path(path)?;
            if input.youtube_key.is_some() {
                return Err(invalid("hosted trailers must not set youtube_key"));
            }
        }
        other => {
            return Err(invalid(&format!(
                "Invalid trailer kind '{other}'. Expected one of: youtube, hosted"
            )))
        }
    }
    if let Some(lang) = input.language.as_deref() {
        input.language = Some(Language::parse(lang)?.code().to_string());
    }
    Ok(())
}

/// GET /api/v1/movies/{id}/trailers
pub async fn list_trailers(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(movie_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Trailer>>>> {
    load_visible_movie(&state, &viewer, movie_id).await?;
    let trailers = TrailerRepo::list_for_movie(&state.pool, movie_id).await?;
    Ok(Json(DataResponse { data: trailers }))
}

/// POST /api/v1/movies/{id}/trailers
pub async fn add_trailer(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(movie_id): Path<DbId>,
    Json(mut input): Json<CreateTrailer>,
) -> AppResult<(StatusCode, Json<DataResponse<Trailer>>)> {
    validate_trailer(&mut input)?;
    MovieRepo::find_by_id(&state.pool, movie_id)
        .await?
        .ok_or_else(|| not_found("Movie", movie_id))?;

    let trailer = TrailerRepo::create(&state.pool, movie_id, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::TRAILER, trailer.id)
            .details(serde_json::json!({ "movie_id": movie_id, "kind": trailer.kind })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: trailer })))
}

/// DELETE /api/v1/movies/{id}/trailers/{trailer_id}
pub async fn delete_trailer(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((movie_id, trailer_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !TrailerRepo::delete(&state.pool, movie_id, trailer_id).await? {
        return Err(not_found("Trailer", trailer_id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::TRAILER, trailer_id)
            .details(serde_json::json!({ "movie_id": movie_id })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
