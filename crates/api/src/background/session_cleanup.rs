//! Periodic purge of expired and revoked refresh-token sessions.

use std::time::Duration;

use chrono::Utc;
use lao_cinema_db::repositories::SessionRepo;
use lao_cinema_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the purge runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Revoked sessions are kept this long before deletion.
pub const REVOKED_RETENTION: chrono::Duration = chrono::Duration::days(1);

/// Delete dead sessions once per `CLEANUP_INTERVAL` until `cancel` fires.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::purge_dead(&pool, Utc::now() - REVOKED_RETENTION).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}
