//! Award shows, categories, and nominations.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AwardShow {
    pub id: DbId,
    pub slug: String,
    pub name_en: String,
    pub name_lo: Option<String>,
    pub country: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AwardCategory {
    pub id: DbId,
    pub show_id: DbId,
    pub name_en: String,
    pub name_lo: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AwardNomination {
    pub id: DbId,
    pub category_id: DbId,
    pub year: i32,
    pub movie_id: Option<DbId>,
    pub person_id: Option<DbId>,
    pub is_winner: bool,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// A nomination joined with its category and show, for per-movie listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MovieAward {
    pub nomination_id: DbId,
    pub year: i32,
    pub is_winner: bool,
    pub person_id: Option<DbId>,
    pub category_id: DbId,
    pub category_name_en: String,
    pub category_name_lo: Option<String>,
    pub show_id: DbId,
    pub show_slug: String,
    pub show_name_en: String,
    pub show_name_lo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAwardShow {
    pub slug: String,
    pub name_en: String,
    pub name_lo: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAwardCategory {
    pub name_en: String,
    pub name_lo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAwardNomination {
    pub category_id: DbId,
    pub year: i32,
    pub movie_id: Option<DbId>,
    pub person_id: Option<DbId>,
    #[serde(default)]
    pub is_winner: bool,
    pub notes: Option<String>,
}
