//! Handler for `POST /anonymous-id`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use lao_cinema_core::anonymous_id::{self, IssuedAnonymousId};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit;
use crate::middleware::viewer::Viewer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnonymousIdRequest {
    /// A client-generated UUID to sign. A fresh one is generated when absent.
    pub anonymous_id: Option<String>,
}

/// POST /api/v1/anonymous-id
///
/// Sign an anonymous visitor id. Sending an existing signed id in
/// `X-Anonymous-Id` re-signs the same id with a fresh expiry.
pub async fn issue(
    State(state): State<AppState>,
    viewer: Viewer,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<IssuedAnonymousId>>)> {
    rate_limit::enforce(&state, &viewer)?;

    // The body is optional; an empty POST asks for a fresh id.
    let requested = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<AnonymousIdRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
            .anonymous_id
    };
    let client_id = requested.as_deref().or(viewer.anonymous_id.as_deref());

    let issued = anonymous_id::issue(
        &state.anonymous_codec,
        client_id,
        Utc::now(),
        state.config.tokens.anonymous_id_ttl,
    )?;

    tracing::debug!(anonymous_id = %issued.anonymous_id, "Anonymous id issued");
    Ok((StatusCode::CREATED, Json(DataResponse { data: issued })))
}
