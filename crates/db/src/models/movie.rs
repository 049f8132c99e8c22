//! Movie entity, translations, images, and list filters.

use chrono::NaiveDate;
use lao_cinema_core::locale::Localized;
use lao_cinema_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    pub slug: String,
    pub original_title: Option<String>,
    pub original_language: String,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub status: String,
    /// Media path of the feature relative to the media root. Never exposed
    /// without a video token.
    #[serde(skip)]
    pub video_path: Option<String>,
    pub rental_price_cents: Option<Cents>,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Movie {
    pub fn is_published(&self) -> bool {
        self.status == lao_cinema_core::validation::movie_status::PUBLISHED
    }

    pub fn has_video(&self) -> bool {
        self.video_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// DTO for creating a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovie {
    pub slug: String,
    pub original_title: Option<String>,
    /// Defaults to `lo` if omitted.
    pub original_language: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    /// Defaults to `draft` if omitted.
    pub status: Option<String>,
    pub video_path: Option<String>,
    pub rental_price_cents: Option<Cents>,
    /// Defaults to `USD` if omitted.
    pub currency: Option<String>,
}

/// DTO for updating a movie. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovie {
    pub slug: Option<String>,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub status: Option<String>,
    pub video_path: Option<String>,
    pub rental_price_cents: Option<Cents>,
    pub currency: Option<String>,
}

/// A row from `movie_translations`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MovieTranslation {
    pub movie_id: DbId,
    pub language: String,
    pub title: String,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub updated_at: Timestamp,
}

impl Localized for MovieTranslation {
    fn language(&self) -> &str {
        &self.language
    }
}

/// Body for `PUT /movies/{id}/translations/{lang}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMovieTranslation {
    pub title: String,
    pub overview: Option<String>,
    pub tagline: Option<String>,
}

/// A row from `movie_images`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MovieImage {
    pub id: DbId,
    pub movie_id: DbId,
    pub kind: String,
    pub path: String,
    pub language: Option<String>,
    pub is_primary: bool,
    pub created_at: Timestamp,
}

/// DTO for attaching an image to a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieImage {
    pub kind: String,
    pub path: String,
    pub language: Option<String>,
    /// When true the new image replaces the current primary of its kind.
    #[serde(default)]
    pub is_primary: bool,
}

/// Filters for listing movies.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    /// Restrict to one status; `None` means any status.
    pub status: Option<String>,
    pub genre_id: Option<DbId>,
    /// Case-insensitive substring match on translated titles and the
    /// original title.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
