//! Short-film packs: bundles of movies rented as one unit.

use lao_cinema_core::locale::Localized;
use lao_cinema_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `short_packs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortPack {
    pub id: DbId,
    pub slug: String,
    pub price_cents: Option<Cents>,
    pub currency: String,
    pub poster_path: Option<String>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortPackTranslation {
    pub pack_id: DbId,
    pub language: String,
    pub title: String,
    pub description: Option<String>,
}

impl Localized for ShortPackTranslation {
    fn language(&self) -> &str {
        &self.language
    }
}

/// A movie inside a pack, joined with its slug for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortPackItem {
    pub id: DbId,
    pub pack_id: DbId,
    pub movie_id: DbId,
    pub movie_slug: String,
    pub runtime_minutes: Option<i32>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackText {
    pub language: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateShortPack {
    pub slug: String,
    pub price_cents: Option<Cents>,
    pub currency: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub translations: Vec<PackText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShortPack {
    pub slug: Option<String>,
    pub price_cents: Option<Cents>,
    pub currency: Option<String>,
    pub poster_path: Option<String>,
    pub is_published: Option<bool>,
    /// When present, each entry is upserted by language.
    pub translations: Option<Vec<PackText>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPackItem {
    pub movie_id: DbId,
    pub display_order: Option<i32>,
}
