//! Trailer model and DTOs.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `trailers` table.
///
/// `video_path` is only set for hosted trailers and is never serialized;
/// clients obtain a trailer token instead.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trailer {
    pub id: DbId,
    pub movie_id: DbId,
    pub kind: String,
    pub youtube_key: Option<String>,
    #[serde(skip)]
    pub video_path: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub display_order: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrailer {
    pub kind: String,
    pub youtube_key: Option<String>,
    pub video_path: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub display_order: Option<i32>,
}
