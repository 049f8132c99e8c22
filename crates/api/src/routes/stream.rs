//! Route definitions for token minting and media delivery.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stream;
use crate::state::AppState;

/// Trailer token route mounted at `/trailers`.
///
/// ```text
/// POST /{id}/token  -> trailer_token (rate limited)
/// ```
pub fn trailer_router() -> Router<AppState> {
    Router::new().route("/{id}/token", post(stream::trailer_token))
}

/// Media routes mounted at `/stream`.
///
/// ```text
/// GET /{*path}?token=  -> stream_file
/// ```
pub fn stream_router() -> Router<AppState> {
    Router::new().route("/{*path}", get(stream::stream_file))
}
