//! Repository for award shows, categories and nominations.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::award::{
    AwardCategory, AwardNomination, AwardShow, CreateAwardCategory, CreateAwardNomination,
    CreateAwardShow, MovieAward,
};

const SHOW_COLUMNS: &str = "id, slug, name_en, name_lo, country, created_at";
const CATEGORY_COLUMNS: &str = "id, show_id, name_en, name_lo, created_at";
const NOMINATION_COLUMNS: &str =
    "id, category_id, year, movie_id, person_id, is_winner, notes, created_at";

pub struct AwardRepo;

impl AwardRepo {
    // -----------------------------------------------------------------------
    // Shows
    // -----------------------------------------------------------------------

    pub async fn create_show(pool: &PgPool, input: &CreateAwardShow) -> Result<AwardShow, sqlx::Error> {
        let query = format!(
            "INSERT INTO award_shows (slug, name_en, name_lo, country)
             VALUES ($1, $2, $3, $4)
             RETURNING {SHOW_COLUMNS}"
        );
        sqlx::query_as::<_, AwardShow>(&query)
            .bind(&input.slug)
            .bind(input.name_en.trim())
            .bind(&input.name_lo)
            .bind(&input.country)
            .fetch_one(pool)
            .await
    }

    pub async fn list_shows(pool: &PgPool) -> Result<Vec<AwardShow>, sqlx::Error> {
        let query = format!("SELECT {SHOW_COLUMNS} FROM award_shows ORDER BY name_en");
        sqlx::query_as::<_, AwardShow>(&query).fetch_all(pool).await
    }

    pub async fn find_show(pool: &PgPool, id: DbId) -> Result<Option<AwardShow>, sqlx::Error> {
        let query = format!("SELECT {SHOW_COLUMNS} FROM award_shows WHERE id = $1");
        sqlx::query_as::<_, AwardShow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_show(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM award_shows WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub async fn create_category(
        pool: &PgPool,
        show_id: DbId,
        input: &CreateAwardCategory,
    ) -> Result<AwardCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO award_categories (show_id, name_en, name_lo)
             VALUES ($1, $2, $3)
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, AwardCategory>(&query)
            .bind(show_id)
            .bind(input.name_en.trim())
            .bind(&input.name_lo)
            .fetch_one(pool)
            .await
    }

    pub async fn categories(pool: &PgPool, show_id: DbId) -> Result<Vec<AwardCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM award_categories WHERE show_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, AwardCategory>(&query)
            .bind(show_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Nominations
    // -----------------------------------------------------------------------

    pub async fn create_nomination(
        pool: &PgPool,
        input: &CreateAwardNomination,
    ) -> Result<AwardNomination, sqlx::Error> {
        let query = format!(
            "INSERT INTO award_nominations (category_id, year, movie_id, person_id, is_winner, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {NOMINATION_COLUMNS}"
        );
        sqlx::query_as::<_, AwardNomination>(&query)
            .bind(input.category_id)
            .bind(input.year)
            .bind(input.movie_id)
            .bind(input.person_id)
            .bind(input.is_winner)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Nominations across every category of a show, newest year first.
    pub async fn nominations_for_show(
        pool: &PgPool,
        show_id: DbId,
    ) -> Result<Vec<AwardNomination>, sqlx::Error> {
        sqlx::query_as::<_, AwardNomination>(
            "SELECT n.id, n.category_id, n.year, n.movie_id, n.person_id, n.is_winner, n.notes,
                    n.created_at
             FROM award_nominations n
             JOIN award_categories c ON c.id = n.category_id
             WHERE c.show_id = $1
             ORDER BY n.year DESC, n.category_id, n.id",
        )
        .bind(show_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_nomination(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM award_nominations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every nomination naming `movie_id`, with category and show labels.
    pub async fn for_movie(pool: &PgPool, movie_id: DbId) -> Result<Vec<MovieAward>, sqlx::Error> {
        sqlx::query_as::<_, MovieAward>(
            "SELECT n.id AS nomination_id, n.year, n.is_winner, n.person_id,
                    c.id AS category_id, c.name_en AS category_name_en,
                    c.name_lo AS category_name_lo,
                    s.id AS show_id, s.slug AS show_slug, s.name_en AS show_name_en,
                    s.name_lo AS show_name_lo
             FROM award_nominations n
             JOIN award_categories c ON c.id = n.category_id
             JOIN award_shows s ON s.id = c.show_id
             WHERE n.movie_id = $1
             ORDER BY n.year DESC, n.is_winner DESC, n.id",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }
}
