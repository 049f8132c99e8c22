//! Handlers for the `/auth` resource.
//!
//! Register and login accept an optional `X-Anonymous-Id` header; rentals and
//! watch progress recorded under that id move to the account on success.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::rental::MigrationSummary;
use lao_cinema_db::models::session::CreateSession;
use lao_cinema_db::models::user::{CreateUser, User, UserResponse};
use lao_cinema_db::repositories::{RentalRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::{self, AuditEntry};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::viewer::{anonymous_id_from_headers, client_ip};
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
    /// Present when anonymous rentals or progress were merged into the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated: Option<MigrationSummary>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let anonymous_id = anonymous_id_from_headers(&headers, &state)?;

    let email = input.email.trim().to_lowercase();
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            display_name: input.display_name.map(|n| n.trim().to_string()),
            role: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::REGISTER)
            .by(Some(user.id))
            .entity(entity_types::USER, user.id)
            .ip(client_ip(&headers)),
    )
    .await;

    let migrated = migrate_if_present(&state, anonymous_id.as_deref(), user.id, &headers).await?;
    let response = create_auth_response(&state, user, &headers, migrated).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let anonymous_id = anonymous_id_from_headers(&headers, &state)?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::LOGIN)
            .by(Some(user.id))
            .ip(client_ip(&headers)),
    )
    .await;

    let migrated = migrate_if_present(&state, anonymous_id.as_deref(), user.id, &headers).await?;
    let response = create_auth_response(&state, user, &headers, migrated).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. The presented token is revoked,
/// so replaying it fails.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()));

    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::claim(&state.pool, &token_hash, Utc::now())
        .await?
        .ok_or_else(invalid)?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, user, &headers, None).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/logout
///
/// Revoke every session of the caller. Returns 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| super::not_found("User", auth_user.user_id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Move anonymous rentals and progress to `user_id` when an id was sent.
pub(crate) async fn migrate_if_present(
    state: &AppState,
    anonymous_id: Option<&str>,
    user_id: DbId,
    headers: &HeaderMap,
) -> AppResult<Option<MigrationSummary>> {
    let Some(aid) = anonymous_id else {
        return Ok(None);
    };

    let summary = RentalRepo::migrate_anonymous(&state.pool, aid, user_id).await?;
    if summary != MigrationSummary::default() {
        audit::record(
            &state.pool,
            AuditEntry::new(action_types::RENTAL_MIGRATE)
                .by(Some(user_id))
                .entity(entity_types::USER, user_id)
                .details(serde_json::json!({
                    "anonymous_id": aid,
                    "rentals": summary.rentals,
                    "watch_progress": summary.watch_progress,
                }))
                .ip(client_ip(headers)),
        )
        .await;
    }
    Ok(Some(summary))
}

/// Mint an access token, persist a refresh session, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: User,
    headers: &HeaderMap,
    migrated: Option<MigrationSummary>,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: state.config.jwt.refresh_expiry(Utc::now()),
            user_agent: headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            ip_address: client_ip(headers),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.into(),
        migrated,
    })
}
