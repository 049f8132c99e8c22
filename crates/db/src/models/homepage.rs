//! Homepage featured list.

use lao_cinema_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A featured slot joined with the movie it points to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeaturedMovie {
    pub movie_id: DbId,
    pub slug: String,
    pub status: String,
    pub display_order: i32,
}
