//! Genre model and DTOs.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `genres` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Genre {
    pub id: DbId,
    pub slug: String,
    pub name_en: String,
    pub name_lo: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenre {
    pub slug: String,
    pub name_en: String,
    pub name_lo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGenre {
    pub slug: Option<String>,
    pub name_en: Option<String>,
    pub name_lo: Option<String>,
}
