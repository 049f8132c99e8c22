//! Role gates built on [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::roles::{can_edit_content, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role; 403 otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `editor` or `admin`; guards every catalogue mutation.
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_edit_content(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Editor or Admin role required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}
