//! Repository for the homepage featured list.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::homepage::FeaturedMovie;

pub struct HomepageRepo;

impl HomepageRepo {
    /// Featured movies in display order. With `published_only`, drafts and
    /// archived movies are skipped.
    pub async fn list_featured(
        pool: &PgPool,
        published_only: bool,
    ) -> Result<Vec<FeaturedMovie>, sqlx::Error> {
        sqlx::query_as::<_, FeaturedMovie>(
            "SELECT f.movie_id, m.slug, m.status, f.display_order
             FROM homepage_featured f
             JOIN movies m ON m.id = f.movie_id
             WHERE NOT $1 OR m.status = 'published'
             ORDER BY f.display_order, f.id",
        )
        .bind(published_only)
        .fetch_all(pool)
        .await
    }

    /// Replace the whole featured list. Position in `movie_ids` becomes the
    /// display order.
    pub async fn replace_featured(pool: &PgPool, movie_ids: &[DbId]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM homepage_featured")
            .execute(&mut *tx)
            .await?;
        for (order, &movie_id) in movie_ids.iter().enumerate() {
            sqlx::query("INSERT INTO homepage_featured (movie_id, display_order) VALUES ($1, $2)")
                .bind(movie_id)
                .bind(order as i32)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }
}
