//! People (cast and crew members) and their translations.

use chrono::NaiveDate;
use lao_cinema_core::locale::Localized;
use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `people` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub known_for_department: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePerson {
    pub known_for_department: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePerson {
    pub known_for_department: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
}

/// A row from `people_translations`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PersonTranslation {
    pub person_id: DbId,
    pub language: String,
    pub name: String,
    pub biography: Option<String>,
}

impl Localized for PersonTranslation {
    fn language(&self) -> &str {
        &self.language
    }
}

/// Body for `PUT /people/{id}/translations/{lang}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPersonTranslation {
    pub name: String,
    pub biography: Option<String>,
}

/// One movie a person is credited on, for filmography listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PersonCredit {
    pub movie_id: DbId,
    pub movie_slug: String,
    /// `cast` or `crew`.
    pub credit_type: String,
    /// Crew department; `None` for cast credits.
    pub department: Option<String>,
    pub release_date: Option<NaiveDate>,
}
