//! Repository for `movies` and its satellite tables (translations, images,
//! genre and production-company links).

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::genre::Genre;
use crate::models::movie::{
    CreateMovie, CreateMovieImage, Movie, MovieFilter, MovieImage, MovieTranslation, UpdateMovie,
    UpsertMovieTranslation,
};
use crate::models::production_company::ProductionCompany;
use crate::repositories::filter::{like_pattern, BindValue, Conditions};

const COLUMNS: &str = "id, slug, original_title, original_language, release_date, \
                        runtime_minutes, status, video_path, rental_price_cents, currency, \
                        created_at, updated_at";

const TRANSLATION_COLUMNS: &str = "movie_id, language, title, overview, tagline, updated_at";

const IMAGE_COLUMNS: &str = "id, movie_id, kind, path, language, is_primary, created_at";

/// Provides CRUD operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the created row.
    ///
    /// Omitted `status`, `original_language` and `currency` fall back to the
    /// column defaults (`draft`, `lo`, `USD`).
    pub async fn create(pool: &PgPool, input: &CreateMovie) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies
                (slug, original_title, original_language, release_date, runtime_minutes,
                 status, video_path, rental_price_cents, currency)
             VALUES ($1, $2, COALESCE($3, 'lo'), $4, $5, COALESCE($6, 'draft'), $7, $8,
                     COALESCE($9, 'USD'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&input.slug)
            .bind(&input.original_title)
            .bind(&input.original_language)
            .bind(input.release_date)
            .bind(input.runtime_minutes)
            .bind(&input.status)
            .bind(&input.video_path)
            .bind(input.rental_price_cents)
            .bind(&input.currency)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List movies matching `filter`, newest release first.
    pub async fn list(pool: &PgPool, filter: &MovieFilter) -> Result<Vec<Movie>, sqlx::Error> {
        let conditions = build_movie_filter(filter);
        let idx = conditions.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM movies m {} \
             ORDER BY release_date DESC NULLS LAST, id DESC \
             LIMIT ${idx} OFFSET ${}",
            conditions.where_clause(),
            idx + 1
        );
        conditions
            .bind_as(sqlx::query_as::<_, Movie>(&query))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count movies matching `filter`, ignoring its limit and offset.
    pub async fn count(pool: &PgPool, filter: &MovieFilter) -> Result<i64, sqlx::Error> {
        let conditions = build_movie_filter(filter);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM movies m {}",
            conditions.where_clause()
        );
        conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a movie. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMovie,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                slug = COALESCE($2, slug),
                original_title = COALESCE($3, original_title),
                original_language = COALESCE($4, original_language),
                release_date = COALESCE($5, release_date),
                runtime_minutes = COALESCE($6, runtime_minutes),
                status = COALESCE($7, status),
                video_path = COALESCE($8, video_path),
                rental_price_cents = COALESCE($9, rental_price_cents),
                currency = COALESCE($10, currency)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.original_title)
            .bind(&input.original_language)
            .bind(input.release_date)
            .bind(input.runtime_minutes)
            .bind(&input.status)
            .bind(&input.video_path)
            .bind(input.rental_price_cents)
            .bind(&input.currency)
            .fetch_optional(pool)
            .await
    }

    /// Id of another movie whose media directory overlaps `dir` (one is the
    /// same as, or nested inside, the other). `dir` ends in `/`.
    pub async fn media_dir_owner(
        pool: &PgPool,
        dir: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM movies
             WHERE video_path IS NOT NULL AND video_path <> ''
               AND ($2::BIGINT IS NULL OR id <> $2)
               AND (starts_with(ltrim(video_path, '/'), $1)
                    OR (strpos(ltrim(video_path, '/'), '/') > 0
                        AND starts_with($1, regexp_replace(ltrim(video_path, '/'), '[^/]*$', ''))))
             ORDER BY id
             LIMIT 1",
        )
        .bind(dir)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a movie and (via cascade) everything hanging off it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Translations
    // -----------------------------------------------------------------------

    pub async fn translations(
        pool: &PgPool,
        movie_id: DbId,
    ) -> Result<Vec<MovieTranslation>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSLATION_COLUMNS} FROM movie_translations
             WHERE movie_id = $1 ORDER BY language"
        );
        sqlx::query_as::<_, MovieTranslation>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    /// Translations for several movies at once, for list pages.
    pub async fn translations_for(
        pool: &PgPool,
        movie_ids: &[DbId],
    ) -> Result<Vec<MovieTranslation>, sqlx::Error> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {TRANSLATION_COLUMNS} FROM movie_translations
             WHERE movie_id = ANY($1) ORDER BY movie_id, language"
        );
        sqlx::query_as::<_, MovieTranslation>(&query)
            .bind(movie_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the translation for `language`.
    pub async fn upsert_translation(
        pool: &PgPool,
        movie_id: DbId,
        language: &str,
        input: &UpsertMovieTranslation,
    ) -> Result<MovieTranslation, sqlx::Error> {
        let query = format!(
            "INSERT INTO movie_translations (movie_id, language, title, overview, tagline)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_movie_translations_movie_language DO UPDATE SET
                title = EXCLUDED.title,
                overview = EXCLUDED.overview,
                tagline = EXCLUDED.tagline
             RETURNING {TRANSLATION_COLUMNS}"
        );
        sqlx::query_as::<_, MovieTranslation>(&query)
            .bind(movie_id)
            .bind(language)
            .bind(input.title.trim())
            .bind(&input.overview)
            .bind(&input.tagline)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Genres & production companies
    // -----------------------------------------------------------------------

    pub async fn genres(pool: &PgPool, movie_id: DbId) -> Result<Vec<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.slug, g.name_en, g.name_lo, g.created_at
             FROM genres g
             JOIN movie_genres mg ON mg.genre_id = g.id
             WHERE mg.movie_id = $1
             ORDER BY g.name_en",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the movie's genre set.
    pub async fn set_genres(
        pool: &PgPool,
        movie_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;
        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO movie_genres (movie_id, genre_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(movie_id)
            .bind(genre_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn production_companies(
        pool: &PgPool,
        movie_id: DbId,
    ) -> Result<Vec<ProductionCompany>, sqlx::Error> {
        sqlx::query_as::<_, ProductionCompany>(
            "SELECT c.id, c.name, c.logo_path, c.origin_country, c.created_at, c.updated_at
             FROM production_companies c
             JOIN movie_production_companies mpc ON mpc.company_id = c.id
             WHERE mpc.movie_id = $1
             ORDER BY c.name",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the movie's production-company set.
    pub async fn set_production_companies(
        pool: &PgPool,
        movie_id: DbId,
        company_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM movie_production_companies WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;
        if !company_ids.is_empty() {
            sqlx::query(
                "INSERT INTO movie_production_companies (movie_id, company_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(movie_id)
            .bind(company_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    pub async fn images(pool: &PgPool, movie_id: DbId) -> Result<Vec<MovieImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM movie_images
             WHERE movie_id = $1
             ORDER BY kind, is_primary DESC, id"
        );
        sqlx::query_as::<_, MovieImage>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    /// Attach an image. When `is_primary` is set, the current primary of the
    /// same kind is demoted in the same transaction.
    pub async fn add_image(
        pool: &PgPool,
        movie_id: DbId,
        input: &CreateMovieImage,
    ) -> Result<MovieImage, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if input.is_primary {
            sqlx::query(
                "UPDATE movie_images SET is_primary = false
                 WHERE movie_id = $1 AND kind = $2 AND is_primary",
            )
            .bind(movie_id)
            .bind(&input.kind)
            .execute(&mut *tx)
            .await?;
        }
        let query = format!(
            "INSERT INTO movie_images (movie_id, kind, path, language, is_primary)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {IMAGE_COLUMNS}"
        );
        let image = sqlx::query_as::<_, MovieImage>(&query)
            .bind(movie_id)
            .bind(&input.kind)
            .bind(&input.path)
            .bind(&input.language)
            .bind(input.is_primary)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(image)
    }

    /// Make `image_id` the primary image of its kind.
    ///
    /// Returns `None` if the image does not belong to `movie_id`.
    pub async fn set_primary_image(
        pool: &PgPool,
        movie_id: DbId,
        image_id: DbId,
    ) -> Result<Option<MovieImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM movie_images
             WHERE id = $1 AND movie_id = $2
             FOR UPDATE"
        );
        let Some(image) = sqlx::query_as::<_, MovieImage>(&query)
            .bind(image_id)
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE movie_images SET is_primary = false
             WHERE movie_id = $1 AND kind = $2 AND is_primary AND id <> $3",
        )
        .bind(movie_id)
        .bind(&image.kind)
        .bind(image_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE movie_images SET is_primary = true WHERE id = $1 RETURNING {IMAGE_COLUMNS}"
        );
        let image = sqlx::query_as::<_, MovieImage>(&query)
            .bind(image_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(image))
    }

    pub async fn delete_image(
        pool: &PgPool,
        movie_id: DbId,
        image_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movie_images WHERE id = $1 AND movie_id = $2")
            .bind(image_id)
            .bind(movie_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn build_movie_filter(filter: &MovieFilter) -> Conditions {
    let mut conditions = Conditions::default();
    if let Some(ref status) = filter.status {
        conditions.push("m.status = ?", BindValue::Text(status.clone()));
    }
    if let Some(genre_id) = filter.genre_id {
        conditions.push(
            "EXISTS (SELECT 1 FROM movie_genres mg WHERE mg.movie_id = m.id AND mg.genre_id = ?)",
            BindValue::BigInt(genre_id),
        );
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        conditions.push(
            "(m.original_title ILIKE ? OR EXISTS (SELECT 1 FROM movie_translations t \
              WHERE t.movie_id = m.id AND t.title ILIKE ?))",
            BindValue::Text(like_pattern(search)),
        );
    }
    conditions
}
