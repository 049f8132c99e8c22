//! Repository for the `trailers` table.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::trailer::{CreateTrailer, Trailer};

const COLUMNS: &str =
    "id, movie_id, kind, youtube_key, video_path, name, language, display_order, created_at";

pub struct TrailerRepo;

impl TrailerRepo {
    pub async fn create(
        pool: &PgPool,
        movie_id: DbId,
        input: &CreateTrailer,
    ) -> Result<Trailer, sqlx::Error> {
        let query = format!(
            "INSERT INTO trailers (movie_id, kind, youtube_key, video_path, name, language, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trailer>(&query)
            .bind(movie_id)
            .bind(&input.kind)
            .bind(&input.youtube_key)
            .bind(&input.video_path)
            .bind(&input.name)
            .bind(&input.language)
            .bind(input.display_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trailer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trailers WHERE id = $1");
        sqlx::query_as::<_, Trailer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_movie(pool: &PgPool, movie_id: DbId) -> Result<Vec<Trailer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trailers WHERE movie_id = $1 ORDER BY display_order, id"
        );
        sqlx::query_as::<_, Trailer>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, movie_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trailers WHERE id = $1 AND movie_id = $2")
            .bind(id)
            .bind(movie_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
