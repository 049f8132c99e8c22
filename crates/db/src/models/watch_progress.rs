//! Watch progress per renter and movie.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchProgress {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub anonymous_id: Option<String>,
    pub movie_id: DbId,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub completed: bool,
    pub updated_at: Timestamp,
}
