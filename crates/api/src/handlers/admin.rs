//! Admin-only user management and audit log browsing.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::roles::{is_known_role, ALL_ROLES, ROLE_ADMIN};
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::audit::{AuditLog, AuditQuery};
use lao_cinema_db::models::user::UserResponse;
use lao_cinema_db::repositories::{AuditLogRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::viewer::client_ip;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Page<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, page.limit(), page.offset()).await?;
    let total = UserRepo::count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: Page {
            items: users.into_iter().map(UserResponse::from).collect(),
            total,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Admins cannot change their own role, so the last admin cannot lock
/// everyone out by accident.
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = input.role.trim().to_ascii_lowercase();
    if !is_known_role(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{}'. Expected one of: {}",
            input.role,
            ALL_ROLES.join(", ")
        ))));
    }
    if id == admin.user_id && role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admins cannot remove their own admin role".into(),
        )));
    }

    let before = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let user = UserRepo::update_role(&state.pool, id, &role)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    // Access tokens carry the role; force a fresh login when it changes.
    let revoked = if before.role != user.role {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?
    } else {
        0
    };

    tracing::info!(
        user_id = id,
        from = %before.role,
        to = %user.role,
        revoked_sessions = revoked,
        "User role changed"
    );
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ROLE_CHANGE)
            .by(Some(admin.user_id))
            .entity(entity_types::USER, id)
            .details(serde_json::json!({ "from": before.role, "to": user.role }))
            .ip(client_ip(&headers)),
    )
    .await;

    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<Page<AuditLog>>>> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
        }
    }
    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}
