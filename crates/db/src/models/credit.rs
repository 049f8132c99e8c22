//! Cast and crew credits with per-language character names and job titles.

use lao_cinema_core::locale::Localized;
use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `movie_cast`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CastCredit {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub display_order: i32,
    pub created_at: Timestamp,
}

/// A row from `movie_crew`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CrewCredit {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub department: String,
    pub display_order: i32,
    pub created_at: Timestamp,
}

/// A translated character name for a cast credit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CastTranslation {
    pub cast_id: DbId,
    pub language: String,
    pub character_name: String,
}

impl Localized for CastTranslation {
    fn language(&self) -> &str {
        &self.language
    }
}

/// A translated job title for a crew credit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CrewTranslation {
    pub crew_id: DbId,
    pub language: String,
    pub job: String,
}

impl Localized for CrewTranslation {
    fn language(&self) -> &str {
        &self.language
    }
}

/// Per-language text attached to a credit on create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditText {
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCastCredit {
    pub person_id: DbId,
    pub display_order: Option<i32>,
    /// Character names keyed by language.
    #[serde(default)]
    pub character_names: Vec<CreditText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCastCredit {
    pub display_order: Option<i32>,
    /// When present, replaces the existing character names.
    pub character_names: Option<Vec<CreditText>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCrewCredit {
    pub person_id: DbId,
    pub department: String,
    pub display_order: Option<i32>,
    #[serde(default)]
    pub jobs: Vec<CreditText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCrewCredit {
    pub display_order: Option<i32>,
    pub jobs: Option<Vec<CreditText>>,
}
