//! Repository for the `genres` table.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::genre::{CreateGenre, Genre, UpdateGenre};

const COLUMNS: &str = "id, slug, name_en, name_lo, created_at";

pub struct GenreRepo;

impl GenreRepo {
    pub async fn create(pool: &PgPool, input: &CreateGenre) -> Result<Genre, sqlx::Error> {
        let query = format!(
            "INSERT INTO genres (slug, name_en, name_lo) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.slug)
            .bind(&input.name_en)
            .bind(&input.name_lo)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE id = $1");
        sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres ORDER BY name_en");
        sqlx::query_as::<_, Genre>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGenre,
    ) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!(
            "UPDATE genres SET
                slug = COALESCE($2, slug),
                name_en = COALESCE($3, name_en),
                name_lo = COALESCE($4, name_lo)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.name_en)
            .bind(&input.name_lo)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
