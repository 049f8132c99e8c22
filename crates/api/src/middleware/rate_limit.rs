//! Per-identity rate limiting for token minting endpoints.

use chrono::Utc;

use super::viewer::Viewer;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Spend one hit of `viewer`'s budget, or fail with 429.
pub fn enforce(state: &AppState, viewer: &Viewer) -> AppResult<()> {
    let key = viewer.rate_limit_key();
    state
        .rate_limiter
        .check(&key, Utc::now().timestamp())
        .map_err(|retry_after_secs| {
            tracing::warn!(key = %key, retry_after_secs, "Rate limit exceeded");
            AppError::RateLimited { retry_after_secs }
        })
}
