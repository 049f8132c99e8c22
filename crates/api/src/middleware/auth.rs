//! JWT-based authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// User authenticated by an `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Role claim (`admin`, `editor` or `viewer`).
    pub role: String,
}

impl AuthUser {
    /// Validate the bearer token in `parts`, if one was sent.
    ///
    /// A missing header is `Ok(None)`; a present but unusable one is an error.
    pub(crate) fn from_parts_optional(
        parts: &Parts,
        state: &AppState,
    ) -> Result<Option<Self>, AppError> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(Some(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        }))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::from_parts_optional(parts, state)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
    }
}
