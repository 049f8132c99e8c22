//! Award shows, their categories and nominations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::validate_slug;
use lao_cinema_db::models::award::{
    AwardCategory, AwardNomination, AwardShow, CreateAwardCategory, CreateAwardNomination,
    CreateAwardShow,
};
use lao_cinema_db::repositories::AwardRepo;
use serde::Serialize;

use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Earliest year accepted for a nomination.
const MIN_AWARD_YEAR: i32 = 1900;

#[derive(Debug, Serialize)]
pub struct CategoryWithNominations {
    #[serde(flatten)]
    pub category: AwardCategory,
    pub nominations: Vec<AwardNomination>,
}

#[derive(Debug, Serialize)]
pub struct AwardShowDetail {
    #[serde(flatten)]
    pub show: AwardShow,
    pub categories: Vec<CategoryWithNominations>,
}

fn require_name(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be empty"
        ))));
    }
    Ok(())
}

fn validate_nomination(input: &CreateAwardNomination) -> AppResult<()> {
    if input.movie_id.is_none() && input.person_id.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "A nomination needs a movie_id or a person_id".into(),
        )));
    }
    if !(MIN_AWARD_YEAR..=2100).contains(&input.year) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "year must be between {MIN_AWARD_YEAR} and 2100"
        ))));
    }
    Ok(())
}

/// Group nominations under their categories, keeping category order.
fn group_by_category(
    categories: Vec<AwardCategory>,
    mut nominations: Vec<AwardNomination>,
) -> Vec<CategoryWithNominations> {
    categories
        .into_iter()
        .map(|category| {
            let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut nominations)
                .into_iter()
                .partition(|n| n.category_id == category.id);
            nominations = rest;
            CategoryWithNominations {
                category,
                nominations: mine,
            }
        })
        .collect()
}

/// GET /api/v1/awards
pub async fn list_shows(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AwardShow>>>> {
    let shows = AwardRepo::list_shows(&state.pool).await?;
    Ok(Json(DataResponse { data: shows }))
}

/// GET /api/v1/awards/{id}
pub async fn get_show(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AwardShowDetail>>> {
    let show = AwardRepo::find_show(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Award show", id))?;
    let categories = AwardRepo::categories(&state.pool, id).await?;
    let nominations = AwardRepo::nominations_for_show(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: AwardShowDetail {
            show,
            categories: group_by_category(categories, nominations),
        },
    }))
}

/// POST /api/v1/awards
pub async fn create_show(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateAwardShow>,
) -> AppResult<(StatusCode, Json<DataResponse<AwardShow>>)> {
    validate_slug(&input.slug)?;
    require_name("name_en", &input.name_en)?;

    let show = AwardRepo::create_show(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::AWARD_SHOW, show.id)
            .details(serde_json::json!({ "slug": show.slug })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: show })))
}

/// DELETE /api/v1/awards/{id}
pub async fn delete_show(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AwardRepo::delete_show(&state.pool, id).await? {
        return Err(not_found("Award show", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::AWARD_SHOW, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/awards/{id}/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(show_id): Path<DbId>,
    Json(input): Json<CreateAwardCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<AwardCategory>>)> {
    require_name("name_en", &input.name_en)?;
    AwardRepo::find_show(&state.pool, show_id)
        .await?
        .ok_or_else(|| not_found("Award show", show_id))?;

    let category = AwardRepo::create_category(&state.pool, show_id, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::AWARD_CATEGORY, category.id)
            .details(serde_json::json!({ "show_id": show_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// POST /api/v1/awards/nominations
///
/// Unknown category, movie or person ids surface as 400 via their foreign keys.
pub async fn create_nomination(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateAwardNomination>,
) -> AppResult<(StatusCode, Json<DataResponse<AwardNomination>>)> {
    validate_nomination(&input)?;

    let nomination = AwardRepo::create_nomination(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::AWARD_NOMINATION, nomination.id)
            .details(serde_json::json!({
                "category_id": nomination.category_id,
                "movie_id": nomination.movie_id,
                "person_id": nomination.person_id,
                "is_winner": nomination.is_winner,
            })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: nomination })))
}

/// DELETE /api/v1/awards/nominations/{id}
pub async fn delete_nomination(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AwardRepo::delete_nomination(&state.pool, id).await? {
        return Err(not_found("Award nomination", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::AWARD_NOMINATION, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
