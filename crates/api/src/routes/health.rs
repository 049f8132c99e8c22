//! Liveness and dependency health, mounted at the root.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether `MEDIA_ROOT` is a readable directory.
    pub media_available: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = lao_cinema_db::health_check(&state.pool).await.is_ok();
    let media_available = tokio::fs::metadata(&state.config.media_root)
        .await
        .is_ok_and(|m| m.is_dir());

    if !db_healthy {
        tracing::warn!("Health check could not reach the database");
    }
    if !media_available {
        tracing::warn!(media_root = %state.config.media_root.display(), "Media root is missing");
    }

    Json(HealthResponse {
        status: if db_healthy && media_available { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        media_available,
    })
}

/// `GET /health`. Not under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
