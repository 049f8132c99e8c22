//! Handlers for the `/genres` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::validate_slug;
use lao_cinema_db::models::genre::{CreateGenre, Genre, UpdateGenre};
use lao_cinema_db::repositories::GenreRepo;

use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name_en must not be empty".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/genres
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Genre>>>> {
    let genres = GenreRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: genres }))
}

/// POST /api/v1/genres
pub async fn create_genre(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateGenre>,
) -> AppResult<(StatusCode, Json<DataResponse<Genre>>)> {
    validate_slug(&input.slug)?;
    validate_name(&input.name_en)?;

    let genre = GenreRepo::create(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::GENRE, genre.id)
            .details(serde_json::json!({ "slug": genre.slug })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: genre })))
}

/// PUT /api/v1/genres/{id}
pub async fn update_genre(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGenre>,
) -> AppResult<Json<DataResponse<Genre>>> {
    if let Some(slug) = input.slug.as_deref() {
        validate_slug(slug)?;
    }
    if let Some(name) = input.name_en.as_deref() {
        validate_name(name)?;
    }

    let genre = GenreRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Genre", id))?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::GENRE, id),
    )
    .await;

    Ok(Json(DataResponse { data: genre }))
}

/// DELETE /api/v1/genres/{id}
pub async fn delete_genre(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !GenreRepo::delete(&state.pool, id).await? {
        return Err(not_found("Genre", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::GENRE, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
