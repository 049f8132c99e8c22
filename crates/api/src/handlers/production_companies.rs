//! Handlers for the `/production-companies` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::validate_media_path;
use lao_cinema_db::models::production_company::{
    CreateProductionCompany, ProductionCompany, UpdateProductionCompany,
};
use lao_cinema_db::repositories::ProductionCompanyRepo;

use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_company(name: Option<&str>, logo_path: Option<&str>) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    if let Some(path) = logo_path {
        validate_media_path(path)?;
    }
    Ok(())
}

/// GET /api/v1/production-companies
pub async fn list_companies(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProductionCompany>>>> {
    let companies = ProductionCompanyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: companies }))
}

/// GET /api/v1/production-companies/{id}
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProductionCompany>>> {
    let company = ProductionCompanyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("ProductionCompany", id))?;
    Ok(Json(DataResponse { data: company }))
}

/// POST /api/v1/production-companies
pub async fn create_company(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateProductionCompany>,
) -> AppResult<(StatusCode, Json<DataResponse<ProductionCompany>>)> {
    validate_company(Some(&input.name), input.logo_path.as_deref())?;

    let company = ProductionCompanyRepo::create(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::PRODUCTION_COMPANY, company.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: company })))
}

/// PUT /api/v1/production-companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProductionCompany>,
) -> AppResult<Json<DataResponse<ProductionCompany>>> {
    validate_company(input.name.as_deref(), input.logo_path.as_deref())?;

    let company = ProductionCompanyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("ProductionCompany", id))?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::PRODUCTION_COMPANY, id),
    )
    .await;

    Ok(Json(DataResponse { data: company }))
}

/// DELETE /api/v1/production-companies/{id}
pub async fn delete_company(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProductionCompanyRepo::delete(&state.pool, id).await? {
        return Err(not_found("ProductionCompany", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::PRODUCTION_COMPANY, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
