//! Watch progress for the current renter.

use axum::extract::{Path, Query, State};
use axum::Json;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::pagination::clamp_limit;
use lao_cinema_core::progress::normalize;
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::watch_progress::WatchProgress;
use lao_cinema_db::repositories::WatchProgressRepo;
use serde::Deserialize;

use super::movies::load_visible_movie;
use crate::error::{AppError, AppResult};
use crate::middleware::viewer::Viewer;
use crate::response::DataResponse;
use crate::state::AppState;

const CONTINUE_WATCHING_DEFAULT: i64 = 10;
const CONTINUE_WATCHING_MAX: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub position_secs: f64,
    pub duration_secs: f64,
}

#[derive(Debug, Deserialize)]
pub struct ContinueWatchingParams {
    pub limit: Option<i64>,
}

/// GET /api/v1/movies/{id}/progress
///
/// `data` is `null` when the renter has not started the movie.
pub async fn get_progress(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(movie_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<WatchProgress>>>> {
    let renter = viewer.require_renter()?;
    load_visible_movie(&state, &viewer, movie_id).await?;
    let progress = WatchProgressRepo::find(&state.pool, &renter, movie_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// PUT /api/v1/movies/{id}/progress
pub async fn update_progress(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(movie_id): Path<DbId>,
    Json(input): Json<UpdateProgressRequest>,
) -> AppResult<Json<DataResponse<WatchProgress>>> {
    let renter = viewer.require_renter()?;
    let normalized = normalize(input.position_secs, input.duration_secs).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "duration_secs must be positive and both values finite".into(),
        ))
    })?;
    load_visible_movie(&state, &viewer, movie_id).await?;

    let progress = WatchProgressRepo::upsert(&state.pool, &renter, movie_id, &normalized).await?;
    tracing::debug!(
        movie_id,
        position_secs = progress.position_secs,
        completed = progress.completed,
        "Watch progress saved"
    );
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/watch-progress
///
/// Unfinished movies, most recently watched first.
pub async fn continue_watching(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ContinueWatchingParams>,
) -> AppResult<Json<DataResponse<Vec<WatchProgress>>>> {
    let renter = viewer.require_renter()?;
    let limit = clamp_limit(params.limit, CONTINUE_WATCHING_DEFAULT, CONTINUE_WATCHING_MAX);
    let items = WatchProgressRepo::continue_watching(&state.pool, &renter, limit).await?;
    Ok(Json(DataResponse { data: items }))
}
